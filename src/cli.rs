use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "db2ctl")]
#[command(version)]
#[command(about = "Discover, converge and configure Db2 instances", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Location of db2ls
    #[arg(long, global = true, env = "DB2CTL_DB2LS", value_name = "PATH")]
    pub db2ls: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show installed software, instances and databases
    Facts(FactsArgs),

    /// Converge one instance to a desired state
    Instance(InstanceArgs),

    /// Converge every instance declared in the desired-state file
    Apply(ApplyArgs),

    /// Run a statement or statement file as the instance owner
    Exec(ExecArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Facts
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FactKind {
    Software,
    Instances,
    Databases,
}

impl From<FactKind> for db2kit::FactFilter {
    fn from(kind: FactKind) -> Self {
        match kind {
            FactKind::Software => Self::Software,
            FactKind::Instances => Self::Instances,
            FactKind::Databases => Self::Databases,
        }
    }
}

#[derive(Args)]
pub struct FactsArgs {
    /// Only gather these facts (repeatable, default: all)
    #[arg(short, long, value_enum)]
    pub filter: Vec<FactKind>,

    /// Print JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Instance
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateArg {
    Present,
    Absent,
}

impl From<StateArg> for db2kit::TargetState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Present => Self::Present,
            StateArg::Absent => Self::Absent,
        }
    }
}

#[derive(Args)]
pub struct InstanceArgs {
    /// Instance name (also the owning user)
    pub name: String,

    /// Installation path used to create the instance
    #[arg(long)]
    pub path: Option<String>,

    /// Desired state
    #[arg(long, value_enum, default_value = "present")]
    pub state: StateArg,

    /// Instance type passed to db2icrt
    #[arg(long = "type", default_value = db2kit::types::DEFAULT_INSTANCE_TYPE)]
    pub instance_type: String,

    /// TCP port for a new instance
    #[arg(long)]
    pub port: Option<u16>,

    /// Authentication type passed to db2icrt
    #[arg(long, default_value = db2kit::types::DEFAULT_AUTH_TYPE)]
    pub auth_type: String,

    /// DBM configuration parameter with a fixed value (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// DBM configuration parameter in automatic mode (repeatable)
    #[arg(long = "set-auto", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set_auto: Vec<(String, String)>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parse `NAME=VALUE`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{s}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

// ============================================================================
// Apply
// ============================================================================

#[derive(Args)]
pub struct ApplyArgs {
    /// Desired-state file (default: <config dir>/instances.toml)
    #[arg(short, long)]
    pub file: Option<String>,

    /// Only converge the named instance
    #[arg(long, value_name = "NAME")]
    pub only: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Exec
// ============================================================================

#[derive(Args)]
#[command(group(ArgGroup::new("input").required(true).args(["command", "file"])))]
pub struct ExecArgs {
    /// Instance to run as
    #[arg(short, long)]
    pub instance: String,

    /// Default database for the statements
    #[arg(short, long)]
    pub database: Option<String>,

    /// Statement to run (without the trailing ';')
    #[arg(short, long)]
    pub command: Option<String>,

    /// File of ';'-terminated statements
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Write the command output to this file
    #[arg(long)]
    pub logfile: Option<PathBuf>,

    /// Decide success from SQL codes, ignoring these (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "CODES")]
    pub ignore_sqlcodes: Option<Vec<String>>,
}
