//! Desired-state file (`instances.toml`).

use anyhow::{Context, Result, bail};
use db2kit::{InstanceSpec, InventoryConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Host-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Location of db2ls
    #[serde(default)]
    pub db2ls: Option<String>,
}

/// Instances that should exist (or not) on this host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub instances: Vec<InstanceSpec>,
}

impl DesiredState {
    /// Load and validate a desired-state file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let state: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid desired-state file {}", path.display()))?;
        state.validate()?;
        Ok(state)
    }

    /// Load from the given path, or the default location
    pub fn load_from(file: Option<&str>) -> Result<(PathBuf, Self)> {
        let path = match file {
            Some(f) => paths::expand(f),
            None => paths::desired_state_file()?,
        };
        let state = Self::load(&path)?;
        Ok((path, state))
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for spec in &self.instances {
            if spec.name.trim().is_empty() {
                bail!("Instance with empty name");
            }
            if !seen.insert(spec.name.as_str()) {
                bail!("Instance '{}' is declared more than once", spec.name);
            }
        }
        Ok(())
    }

    /// Instances to converge, optionally narrowed to one name
    pub fn select(&self, only: Option<&str>) -> Result<Vec<InstanceSpec>> {
        match only {
            None => Ok(self.instances.clone()),
            Some(name) => {
                let spec = self
                    .instances
                    .iter()
                    .find(|s| s.name == name)
                    .with_context(|| format!("Instance '{name}' is not declared"))?;
                Ok(vec![spec.clone()])
            }
        }
    }
}

/// Discovery settings: the command line wins over the file, the file over
/// the built-in default.
pub fn inventory_config(cli_db2ls: Option<&str>, settings: Option<&Settings>) -> InventoryConfig {
    let configured = cli_db2ls.or_else(|| settings.and_then(|s| s.db2ls.as_deref()));
    match configured {
        Some(path) => InventoryConfig::with_db2ls(paths::expand(path)),
        None => InventoryConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db2kit::TargetState;

    const DESIRED: &str = r#"
[settings]
db2ls = "/opt/tools/db2ls"

[[instances]]
name = "db2inst1"
path = "/opt/ibm/db2/V11.5"
port = 50000

[[instances.configurations]]
name = "INSTANCE_MEMORY"
value = "2000000"
automatic = true

[[instances.configurations]]
name = "NUMDB"
value = "20"

[[instances]]
name = "db2old"
state = "absent"
"#;

    fn write(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instances.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_desired_state() {
        let (_dir, path) = write(DESIRED);
        let state = DesiredState::load(&path).unwrap();

        assert_eq!(state.settings.db2ls.as_deref(), Some("/opt/tools/db2ls"));
        assert_eq!(state.instances.len(), 2);

        let inst1 = &state.instances[0];
        assert_eq!(inst1.port, Some(50000));
        assert_eq!(inst1.instance_type, "WSE");
        assert_eq!(inst1.configurations.len(), 2);
        assert!(inst1.configurations[0].automatic);
        assert!(!inst1.configurations[1].automatic);

        assert_eq!(state.instances[1].state, TargetState::Absent);
        assert!(state.instances[1].path.is_none());
    }

    #[test]
    fn test_load_numeric_parameter_values() {
        let (_dir, path) = write(
            r#"
[[instances]]
name = "db2inst1"
configurations = [
    { name = "NUMDB", value = 20 },
    { name = "INSTANCE_MEMORY", value = 2000000, automatic = true },
]
"#,
        );
        let state = DesiredState::load(&path).unwrap();
        let configurations = &state.instances[0].configurations;
        assert_eq!(configurations[0].value, "20");
        assert_eq!(configurations[1].value, "2000000");
        assert!(configurations[1].automatic);
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let (_dir, path) = write(
            r#"
[[instances]]
name = "db2inst1"

[[instances]]
name = "db2inst1"
"#,
        );
        let err = DesiredState::load(&path).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_load_rejects_bad_state() {
        let (_dir, path) = write("[[instances]]\nname = \"db2inst1\"\nstate = \"running\"\n");
        assert!(DesiredState::load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DesiredState::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Could not read"));
    }

    #[test]
    fn test_select() {
        let (_dir, path) = write(DESIRED);
        let state = DesiredState::load(&path).unwrap();
        assert_eq!(state.select(None).unwrap().len(), 2);
        assert_eq!(state.select(Some("db2old")).unwrap()[0].name, "db2old");
        assert!(state.select(Some("db2inst9")).is_err());
    }

    #[test]
    fn test_inventory_config_precedence() {
        let settings = Settings {
            db2ls: Some("/opt/tools/db2ls".to_string()),
        };
        assert_eq!(
            inventory_config(Some("/usr/bin/db2ls"), Some(&settings)).db2ls_path,
            PathBuf::from("/usr/bin/db2ls")
        );
        assert_eq!(
            inventory_config(None, Some(&settings)).db2ls_path,
            PathBuf::from("/opt/tools/db2ls")
        );
        assert_eq!(inventory_config(None, None), InventoryConfig::default());
    }
}
