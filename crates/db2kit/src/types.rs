//! Common types for Db2 facts, desired state and reconciliation results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default instance type passed to `db2icrt -s`.
pub const DEFAULT_INSTANCE_TYPE: &str = "WSE";

/// Default authentication type passed to `db2icrt -a`.
pub const DEFAULT_AUTH_TYPE: &str = "SERVER_ENCRYPT";

// ============================================================================
// Observed facts
// ============================================================================

/// One line of the software listing, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareInstallation {
    /// Installation root, e.g. `/opt/ibm/db2/V11.5`
    pub path: String,
    /// Version, release, modification, fix pack (e.g. `11.5.8.0`)
    pub vrmf: String,
    /// Fix pack level, verbatim
    pub fixpack: String,
    /// Special build flag, verbatim
    pub special: String,
}

/// Version information of an installation, keyed by its path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareInfo {
    pub vrmf: String,
    pub fixpack: String,
    pub special: String,
}

impl From<&SoftwareInstallation> for SoftwareInfo {
    fn from(sw: &SoftwareInstallation) -> Self {
        Self {
            vrmf: sw.vrmf.clone(),
            fixpack: sw.fixpack.clone(),
            special: sw.special.clone(),
        }
    }
}

/// An instance registered under an installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInfo {
    /// Path of the owning installation
    pub path: String,
}

/// A raw record from the database directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub alias: String,
    pub name: String,
}

/// A local database of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseEntry {
    pub database_alias: String,
    pub database_name: String,
    pub instance_name: String,
    pub instance_path: String,
}

impl DatabaseEntry {
    /// Key under which this entry is reported: `<instance>_<database name>`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.instance_name, self.database_name)
    }
}

/// Occurrences of each SQL return code in one command's output.
pub type SqlCodeTally = BTreeMap<String, usize>;

/// Subset of facts to gather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactFilter {
    Software,
    Instances,
    Databases,
}

/// Gathered host facts. Absent subsets were not requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facts {
    #[serde(rename = "db2_software_list", skip_serializing_if = "Option::is_none")]
    pub software: Option<BTreeMap<String, SoftwareInfo>>,
    #[serde(rename = "db2_instance_list", skip_serializing_if = "Option::is_none")]
    pub instances: Option<BTreeMap<String, InstanceInfo>>,
    #[serde(rename = "db2_database_list", skip_serializing_if = "Option::is_none")]
    pub databases: Option<BTreeMap<String, DatabaseEntry>>,
}

// ============================================================================
// Desired state
// ============================================================================

/// Desired lifecycle state of an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetState {
    #[default]
    Present,
    Absent,
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// One desired DBM configuration parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigParameter {
    /// Parameter keyword, matched case-insensitively
    pub name: String,
    /// Desired value, compared as a plain string. Numbers and booleans in
    /// the input are accepted and kept in their textual form.
    #[serde(deserialize_with = "deserialize_scalar_string")]
    pub value: String,
    /// Request automatic tuning with `value` as the starting point
    #[serde(default)]
    pub automatic: bool,
}

impl ConfigParameter {
    /// A fixed-value parameter.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            automatic: false,
        }
    }

    /// An automatically tuned parameter.
    pub fn automatic(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            automatic: true,
            ..Self::new(name, value)
        }
    }
}

/// Accept a string, integer, float or boolean and keep its text.
fn deserialize_scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct ScalarVisitor;

    impl de::Visitor<'_> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(ScalarVisitor)
}

/// Desired state of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// Instance name (also the owning OS user)
    pub name: String,
    /// Installation path used for creation (and as drop fallback)
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub state: TargetState,
    /// Instance type for `db2icrt -s`
    #[serde(default = "default_instance_type", rename = "type")]
    pub instance_type: String,
    /// Authentication type for `db2icrt -a`
    #[serde(default = "default_auth_type")]
    pub auth_type: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub configurations: Vec<ConfigParameter>,
}

fn default_instance_type() -> String {
    DEFAULT_INSTANCE_TYPE.to_string()
}

fn default_auth_type() -> String {
    DEFAULT_AUTH_TYPE.to_string()
}

impl InstanceSpec {
    /// A present instance with default type and authentication.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            state: TargetState::Present,
            instance_type: default_instance_type(),
            auth_type: default_auth_type(),
            port: None,
            configurations: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_state(mut self, state: TargetState) -> Self {
        self.state = state;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_configuration(mut self, parameter: ConfigParameter) -> Self {
        self.configurations.push(parameter);
        self
    }
}

// ============================================================================
// Results
// ============================================================================

/// Outcome of reconciling one instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileResult {
    pub instance: String,
    /// Anything on the host was changed
    pub changed: bool,
    pub created: bool,
    pub started: bool,
    pub dropped: bool,
    /// Generated `db2icrt`/`db2idrop` command, if one was issued
    pub lifecycle_command: Option<String>,
    /// DBM configuration updates that were issued
    pub config_updates: Vec<String>,
}

/// Output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::new(0, stdout, "")
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            // Killed by a signal: no code, report as generic failure
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_spec_defaults() {
        let spec: InstanceSpec = serde_json::from_str(
            r#"{"name": "db2inst1", "configurations": [{"name": "numdb", "value": "20"}]}"#,
        )
        .unwrap();
        assert_eq!(spec.state, TargetState::Present);
        assert_eq!(spec.instance_type, "WSE");
        assert_eq!(spec.auth_type, "SERVER_ENCRYPT");
        assert_eq!(spec.port, None);
        assert!(!spec.configurations[0].automatic);
    }

    #[test]
    fn test_database_entry_key() {
        let entry = DatabaseEntry {
            database_alias: "SAMPLE".to_string(),
            database_name: "SAMPLE".to_string(),
            instance_name: "db2inst1".to_string(),
            instance_path: "/opt/ibm/db2/V11.5".to_string(),
        };
        assert_eq!(entry.key(), "db2inst1_SAMPLE");
    }

    #[test]
    fn test_config_parameter_constructors() {
        assert!(!ConfigParameter::new("NUMDB", "20").automatic);
        assert!(ConfigParameter::automatic("INSTANCE_MEMORY", "2000").automatic);
    }

    #[test]
    fn test_config_parameter_value_accepts_scalars() {
        let numeric: ConfigParameter =
            serde_json::from_str(r#"{"name": "NUMDB", "value": 20}"#).unwrap();
        assert_eq!(numeric, ConfigParameter::new("NUMDB", "20"));

        let text: ConfigParameter =
            serde_json::from_str(r#"{"name": "SVCENAME", "value": "db2c_db2inst1"}"#).unwrap();
        assert_eq!(text.value, "db2c_db2inst1");

        let flag: ConfigParameter =
            serde_json::from_str(r#"{"name": "DFT_MON_LOCK", "value": true}"#).unwrap();
        assert_eq!(flag.value, "true");

        let err = serde_json::from_str::<ConfigParameter>(r#"{"name": "NUMDB", "value": [20]}"#);
        assert!(err.is_err());
    }
}
