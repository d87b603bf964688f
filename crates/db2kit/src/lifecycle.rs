//! Instance lifecycle: observe, plan, and act.
//!
//! Planning is pure. Observation and execution go through a [`Host`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::backend::Host;
use crate::clp::run_statement;
use crate::error::{Error, Result};
use crate::privilege::as_root;
use crate::types::{InstanceInfo, InstanceSpec, TargetState};

/// Process name of a running instance's system controller.
pub const ENGINE_PROCESS: &str = "db2sysc";

/// Statement that starts an instance.
pub const START_STATEMENT: &str = "START DATABASE MANAGER";

/// Observed state of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Absent,
    PresentNotRunning,
    PresentRunning,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::PresentNotRunning => write!(f, "stopped"),
            Self::PresentRunning => write!(f, "running"),
        }
    }
}

/// A step that moves an instance towards its target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Create,
    Start,
    Drop,
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Start => write!(f, "start"),
            Self::Drop => write!(f, "drop"),
        }
    }
}

/// Actions needed to go from `observed` to `target`, in execution order.
pub fn plan(target: TargetState, observed: LifecycleState) -> Vec<LifecycleAction> {
    use LifecycleAction::{Create, Drop, Start};
    use LifecycleState::{Absent, PresentNotRunning, PresentRunning};

    match (target, observed) {
        (TargetState::Present, Absent) => vec![Create, Start],
        (TargetState::Present, PresentNotRunning) => vec![Start],
        (TargetState::Present, PresentRunning) | (TargetState::Absent, Absent) => Vec::new(),
        (TargetState::Absent, PresentNotRunning | PresentRunning) => vec![Drop],
    }
}

/// Whether the engine process runs under `user`.
///
/// `ps` exits with 1 when the user owns no processes, which is simply
/// "not running". Anything on stderr, or any other exit code, means the
/// list could not be read.
pub fn is_running(host: &dyn Host, user: &str) -> Result<bool> {
    let command = format!("ps -u {user} --no-headers -o comm");
    let output = host.run(&command)?;

    if !output.stderr.trim().is_empty() || !matches!(output.code, 0 | 1) {
        return Err(Error::ProcessListUnreadable {
            user: user.to_string(),
            code: output.code,
            stderr: output.stderr,
        });
    }

    Ok(output.stdout.lines().any(|l| l.trim() == ENGINE_PROCESS))
}

/// Observe one instance against the current instance registry.
pub fn observe(
    host: &dyn Host,
    instances: &BTreeMap<String, InstanceInfo>,
    name: &str,
) -> Result<LifecycleState> {
    if !instances.contains_key(name) {
        return Ok(LifecycleState::Absent);
    }
    if is_running(host, name)? {
        Ok(LifecycleState::PresentRunning)
    } else {
        Ok(LifecycleState::PresentNotRunning)
    }
}

/// `db2icrt` invocation for a desired instance.
pub fn create_command(spec: &InstanceSpec) -> Result<String> {
    let path = spec.path.as_deref().ok_or_else(|| Error::MissingInstallPath {
        instance: spec.name.clone(),
    })?;

    let mut command = format!(
        "{} -a {} -s {}",
        Path::new(path).join("instance").join("db2icrt").display(),
        spec.auth_type,
        spec.instance_type
    );
    if let Some(port) = spec.port {
        command.push_str(&format!(" -p {port}"));
    }
    command.push_str(&format!(" -u {0} {0}", spec.name));
    Ok(command)
}

/// `db2idrop` invocation for a registered instance.
///
/// The installation the instance is registered under wins over the
/// desired path.
pub fn drop_command(
    spec: &InstanceSpec,
    instances: &BTreeMap<String, InstanceInfo>,
) -> Result<String> {
    let path = instances
        .get(&spec.name)
        .map(|info| info.path.as_str())
        .or(spec.path.as_deref())
        .ok_or_else(|| Error::MissingInstallPath {
            instance: spec.name.clone(),
        })?;

    Ok(format!(
        "{} {}",
        Path::new(path).join("instance").join("db2idrop").display(),
        spec.name
    ))
}

/// Run one action. Returns the `db2icrt`/`db2idrop` command line when one
/// was issued.
///
/// Create and drop run as root (through `/bin/sudo` for other users);
/// start runs as the instance owner.
pub fn execute_action(
    host: &dyn Host,
    spec: &InstanceSpec,
    instances: &BTreeMap<String, InstanceInfo>,
    action: LifecycleAction,
) -> Result<Option<String>> {
    log::info!("{action} instance {}", spec.name);

    match action {
        LifecycleAction::Create => {
            let command = as_root(host, &create_command(spec)?);
            host.run_checked(&command)?;
            Ok(Some(command))
        }
        LifecycleAction::Drop => {
            let command = as_root(host, &drop_command(spec, instances)?);
            host.run_checked(&command)?;
            Ok(Some(command))
        }
        LifecycleAction::Start => {
            run_statement(host, &spec.name, START_STATEMENT)?;
            Ok(None)
        }
    }
}
