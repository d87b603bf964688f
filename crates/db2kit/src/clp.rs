//! Db2 command line processor (CLP) bridge.
//!
//! Every logical Db2 command becomes one composite shell invocation that
//! sources the instance owner's `db2profile`, optionally selects a default
//! database, then runs either a single statement or a whole file:
//!
//! ```text
//! LANG=C PATH=/bin:/usr/bin . /home/db2inst1/sqllib/db2profile; db2 -tx "GET DBM CFG;"
//! LANG=C PATH=/bin:/usr/bin . /home/db2inst1/sqllib/db2profile; DB2DBDFT=SAMPLE db2 -vtxf /tmp/ddl.sql
//! ```
//!
//! The result is wrapped with [`Elevation`] so it runs as the owner.

use std::path::{Path, PathBuf};

use crate::backend::Host;
use crate::error::{Error, Result};
use crate::parser::extract_sql_codes;
use crate::privilege::{Elevation, escape_double};
use crate::types::{CommandOutput, SqlCodeTally};

/// Exit code reported when a non-ignorable SQL code is found.
pub const SQLCODE_FAILURE_RC: i32 = 100;

/// What the CLP should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClpInput {
    /// One statement, terminated with `;` by the bridge
    Statement(String),
    /// A file of `;`-terminated statements, run with stop-on-error and echo
    File(PathBuf),
}

impl ClpInput {
    /// Treat `command_or_file` as a file when one exists at that path.
    pub fn detect(host: &dyn Host, command_or_file: &str) -> Self {
        let path = Path::new(command_or_file);
        if host.exists(path) {
            Self::File(path.to_path_buf())
        } else {
            Self::Statement(command_or_file.to_string())
        }
    }
}

/// Location of an instance owner's `db2profile`.
pub fn profile_path(host: &dyn Host, instance: &str) -> Result<PathBuf> {
    let home = host.home_dir(instance).ok_or_else(|| Error::HomeNotFound {
        user: instance.to_string(),
    })?;
    Ok(home.join("sqllib").join("db2profile"))
}

/// Build the unwrapped CLP script.
pub fn script(profile: &Path, database: Option<&str>, input: &ClpInput) -> String {
    let mut script = format!("LANG=C PATH=/bin:/usr/bin . {}; ", profile.display());

    if let Some(db) = database {
        script.push_str(&format!("DB2DBDFT={db} "));
    }

    match input {
        ClpInput::Statement(stmt) => {
            script.push_str(&format!("db2 -tx \"{};\"", escape_double(stmt)));
        }
        ClpInput::File(path) => {
            script.push_str(&format!("db2 -vtxf {}", path.display()));
        }
    }

    script
}

/// Build the full command line for `input`, run as the instance owner.
pub fn command_line(
    host: &dyn Host,
    instance: &str,
    database: Option<&str>,
    input: &ClpInput,
) -> Result<String> {
    let profile = profile_path(host, instance)?;
    let script = script(&profile, database, input);
    Ok(Elevation::on_host(host, instance).wrap(&script))
}

/// Run one statement as the instance owner; non-zero exit is an error.
pub fn run_statement(host: &dyn Host, instance: &str, statement: &str) -> Result<CommandOutput> {
    let input = ClpInput::Statement(statement.to_string());
    let command = command_line(host, instance, None, &input)?;
    let output = host.run(&command)?;
    if !output.success() {
        return Err(Error::command_failed(command, &output));
    }
    Ok(output)
}

// ============================================================================
// One-shot execution
// ============================================================================

/// A single statement or statement file to run against an instance.
#[derive(Debug, Clone, Default)]
pub struct ExecRequest {
    pub instance: String,
    pub database: Option<String>,
    /// Statement text, or a path to a statement file
    pub command_or_file: String,
    /// Write stdout here after the run
    pub logfile: Option<PathBuf>,
    /// When set, success is decided by the SQL codes found instead of
    /// the exit code
    pub ignorable_sqlcodes: Option<Vec<String>>,
}

/// What a one-shot execution produced.
#[derive(Debug, Clone, Default)]
pub struct ExecOutcome {
    /// The generated command line
    pub command_line: String,
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
    pub sqlcodes: SqlCodeTally,
    /// Soft failures (e.g. logfile not writable)
    pub warnings: Vec<String>,
}

/// Decide the exit code from SQL codes alone.
///
/// Returns 0 when every code found is in `ignorable`.
pub fn classify_sqlcodes(tally: &SqlCodeTally, ignorable: &[String]) -> i32 {
    let fatal = tally
        .keys()
        .any(|code| code != "0" && !ignorable.iter().any(|i| i.eq_ignore_ascii_case(code)));
    if fatal { SQLCODE_FAILURE_RC } else { 0 }
}

/// Run a statement or file and classify the outcome.
///
/// A non-zero final exit code is returned as [`Error::CommandFailed`].
pub fn execute(host: &dyn Host, request: &ExecRequest) -> Result<ExecOutcome> {
    let input = ClpInput::detect(host, &request.command_or_file);
    let command = command_line(host, &request.instance, request.database.as_deref(), &input)?;
    let output = host.run(&command)?;

    let mut outcome = ExecOutcome {
        command_line: command,
        code: output.code,
        sqlcodes: extract_sql_codes(&output.stdout),
        stdout: output.stdout,
        stderr: output.stderr,
        warnings: Vec::new(),
    };

    if let Some(logfile) = &request.logfile
        && let Err(e) = std::fs::write(logfile, &outcome.stdout)
    {
        let warning = format!("Logfile {} could not be written: {e}", logfile.display());
        log::warn!("{warning}");
        outcome.warnings.push(warning);
    }

    if let Some(ignorable) = &request.ignorable_sqlcodes {
        outcome.code = classify_sqlcodes(&outcome.sqlcodes, ignorable);
        if outcome.code != 0 {
            outcome.stderr = std::mem::take(&mut outcome.stdout);
            outcome.stdout = format!(
                "Found following SQLCODES: {:?}. Please see STDERR for details.",
                outcome.sqlcodes
            );
        }
    }

    if outcome.code != 0 {
        return Err(Error::CommandFailed {
            command: outcome.command_line,
            code: outcome.code,
            stdout: outcome.stdout,
            stderr: outcome.stderr,
        });
    }

    Ok(outcome)
}
