//! DBM configuration convergence.
//!
//! The current configuration is read with `GET DBM CFG`, compared with the
//! desired parameters, and only differing parameters are updated.

use std::collections::BTreeMap;
use std::fmt;

use crate::backend::Host;
use crate::clp::run_statement;
use crate::error::{Error, Result};
use crate::parser::parse_configuration_snapshot;
use crate::types::ConfigParameter;

/// Current DBM configuration: uppercase parameter name to raw value.
pub type ConfigSnapshot = BTreeMap<String, String>;

/// One pending `UPDATE DBM CFG`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigUpdate {
    /// Uppercase parameter name
    pub name: String,
    pub value: String,
    pub automatic: bool,
}

impl fmt::Display for ConfigUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE DBM CFG USING {} {}", self.name, self.value)?;
        if self.automatic {
            write!(f, " AUTOMATIC")?;
        }
        Ok(())
    }
}

/// The value a snapshot shows once `parameter` is in its desired state.
fn converged_value(parameter: &ConfigParameter) -> String {
    if parameter.automatic {
        format!("AUTOMATIC({})", parameter.value)
    } else {
        parameter.value.clone()
    }
}

/// Read the instance's current DBM configuration.
pub fn read_snapshot(host: &dyn Host, instance: &str) -> Result<ConfigSnapshot> {
    let output = run_statement(host, instance, "GET DBM CFG")?;
    Ok(parse_configuration_snapshot(&output.stdout))
}

/// Updates needed to bring `snapshot` to `desired`, in desired order.
///
/// Every desired name must exist in the snapshot; otherwise nothing is
/// planned and [`Error::UnknownParameter`] is returned.
pub fn plan_updates(
    instance: &str,
    snapshot: &ConfigSnapshot,
    desired: &[ConfigParameter],
) -> Result<Vec<ConfigUpdate>> {
    if let Some(unknown) = desired
        .iter()
        .map(|p| p.name.to_uppercase())
        .find(|name| !snapshot.contains_key(name))
    {
        return Err(Error::UnknownParameter {
            instance: instance.to_string(),
            name: unknown,
        });
    }

    let updates = desired
        .iter()
        .filter_map(|parameter| {
            let name = parameter.name.to_uppercase();
            let current = snapshot.get(&name)?;
            if *current == converged_value(parameter) {
                log::debug!("{instance}: {name} already {current}");
                return None;
            }
            Some(ConfigUpdate {
                name,
                value: parameter.value.clone(),
                automatic: parameter.automatic,
            })
        })
        .collect();

    Ok(updates)
}

/// Issue updates in order, stopping at the first failure.
///
/// Returns the statements issued. A failure after some updates succeeded
/// is reported as [`Error::PartiallyApplied`].
pub fn apply_updates(
    host: &dyn Host,
    instance: &str,
    updates: &[ConfigUpdate],
) -> Result<Vec<String>> {
    let mut applied = Vec::with_capacity(updates.len());

    for update in updates {
        let statement = update.to_string();
        log::info!("{instance}: {statement}");

        if let Err(source) = run_statement(host, instance, &statement) {
            if applied.is_empty() {
                return Err(source);
            }
            return Err(Error::PartiallyApplied {
                applied,
                source: Box::new(source),
            });
        }
        applied.push(statement);
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHost;
    use crate::types::CommandOutput;

    const DBM_CFG: &str = "
          Database Manager Configuration

     Node type = Enterprise Server Edition with local and remote clients

 Max number of concurrently active databases     (NUMDB) = 32
 Number of FCM buffers                 (FCM_NUM_BUFFERS) = AUTOMATIC(4096)
 Instance memory for agents  (KB)      (INSTANCE_MEMORY) = AUTOMATIC(2000)
 TCP/IP Service name                          (SVCENAME) = db2c_db2inst1
 Default database monitor switches
   Sort                                 (DFT_MON_SORT) = ON
";

    fn snapshot() -> ConfigSnapshot {
        parse_configuration_snapshot(DBM_CFG)
    }

    fn host() -> MockHost {
        MockHost::new()
            .as_user("db2inst1")
            .with_home("db2inst1", "/home/db2inst1")
    }

    #[test]
    fn test_update_display() {
        let update = ConfigUpdate {
            name: "NUMDB".to_string(),
            value: "20".to_string(),
            automatic: false,
        };
        assert_eq!(update.to_string(), "UPDATE DBM CFG USING NUMDB 20");

        let update = ConfigUpdate {
            name: "INSTANCE_MEMORY".to_string(),
            value: "4000".to_string(),
            automatic: true,
        };
        assert_eq!(
            update.to_string(),
            "UPDATE DBM CFG USING INSTANCE_MEMORY 4000 AUTOMATIC"
        );
    }

    #[test]
    fn test_plan_only_differences() {
        let desired = vec![
            ConfigParameter::new("numdb", "32"),
            ConfigParameter::new("svcename", "50000"),
            ConfigParameter::new("DFT_MON_SORT", "ON"),
        ];
        let updates = plan_updates("db2inst1", &snapshot(), &desired).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].to_string(), "UPDATE DBM CFG USING SVCENAME 50000");
    }

    #[test]
    fn test_plan_automatic_flag() {
        // Same starting value but fixed: must switch off automatic mode
        let fixed = vec![ConfigParameter::new("FCM_NUM_BUFFERS", "4096")];
        let updates = plan_updates("db2inst1", &snapshot(), &fixed).unwrap();
        assert_eq!(
            updates[0].to_string(),
            "UPDATE DBM CFG USING FCM_NUM_BUFFERS 4096"
        );

        let automatic = vec![ConfigParameter::automatic("FCM_NUM_BUFFERS", "4096")];
        assert!(plan_updates("db2inst1", &snapshot(), &automatic).unwrap().is_empty());

        let retune = vec![ConfigParameter::automatic("INSTANCE_MEMORY", "4000")];
        let updates = plan_updates("db2inst1", &snapshot(), &retune).unwrap();
        assert_eq!(
            updates[0].to_string(),
            "UPDATE DBM CFG USING INSTANCE_MEMORY 4000 AUTOMATIC"
        );

        // Automatic requested for a fixed parameter
        let switch_on = vec![ConfigParameter::automatic("NUMDB", "32")];
        let updates = plan_updates("db2inst1", &snapshot(), &switch_on).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(
            updates[0].to_string(),
            "UPDATE DBM CFG USING NUMDB 32 AUTOMATIC"
        );
    }

    #[test]
    fn test_plan_is_idempotent() {
        let desired = vec![
            ConfigParameter::new("NUMDB", "20"),
            ConfigParameter::automatic("INSTANCE_MEMORY", "4000"),
        ];
        let updates = plan_updates("db2inst1", &snapshot(), &desired).unwrap();
        assert_eq!(updates.len(), 2);

        let mut converged = snapshot();
        converged.insert("NUMDB".to_string(), "20".to_string());
        converged.insert("INSTANCE_MEMORY".to_string(), "AUTOMATIC(4000)".to_string());
        assert!(plan_updates("db2inst1", &converged, &desired).unwrap().is_empty());
    }

    #[test]
    fn test_plan_unknown_parameter() {
        let desired = vec![
            ConfigParameter::new("NUMDB", "20"),
            ConfigParameter::new("no_such_param", "1"),
        ];
        let err = plan_updates("db2inst1", &snapshot(), &desired).unwrap_err();
        match err {
            Error::UnknownParameter { instance, name } => {
                assert_eq!(instance, "db2inst1");
                assert_eq!(name, "NO_SUCH_PARAM");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_snapshot() {
        let host = host().on_contains("GET DBM CFG;", CommandOutput::ok(DBM_CFG));
        let snapshot = read_snapshot(&host, "db2inst1").unwrap();
        assert_eq!(snapshot["NUMDB"], "32");
        assert_eq!(snapshot["FCM_NUM_BUFFERS"], "AUTOMATIC(4096)");
    }

    #[test]
    fn test_read_snapshot_failure() {
        let host = host().on_contains(
            "GET DBM CFG;",
            CommandOutput::new(4, "SQL1092N  The requested command is not authorized.", ""),
        );
        let err = read_snapshot(&host, "db2inst1").unwrap_err();
        assert!(err.failed_command().unwrap().contains("GET DBM CFG;"));
    }

    #[test]
    fn test_apply_in_order() {
        let host = host();
        let updates = plan_updates(
            "db2inst1",
            &snapshot(),
            &[
                ConfigParameter::new("SVCENAME", "50000"),
                ConfigParameter::new("NUMDB", "20"),
            ],
        )
        .unwrap();
        let applied = apply_updates(&host, "db2inst1", &updates).unwrap();
        assert_eq!(
            applied,
            vec![
                "UPDATE DBM CFG USING SVCENAME 50000",
                "UPDATE DBM CFG USING NUMDB 20"
            ]
        );
        let calls = host.calls_containing("UPDATE DBM CFG");
        assert_eq!(calls.len(), 2);
        assert!(calls[0].contains("SVCENAME"));
    }

    #[test]
    fn test_apply_aborts_on_failure() {
        let host = host().on_contains(
            "USING NUMDB",
            CommandOutput::new(4, "SQL5130N  The value \"0\" is not in range.", ""),
        );
        let updates = vec![
            ConfigUpdate {
                name: "SVCENAME".to_string(),
                value: "50000".to_string(),
                automatic: false,
            },
            ConfigUpdate {
                name: "NUMDB".to_string(),
                value: "0".to_string(),
                automatic: false,
            },
            ConfigUpdate {
                name: "DFT_MON_SORT".to_string(),
                value: "OFF".to_string(),
                automatic: false,
            },
        ];

        let err = apply_updates(&host, "db2inst1", &updates).unwrap_err();
        match &err {
            Error::PartiallyApplied { applied, source } => {
                assert_eq!(applied, &vec!["UPDATE DBM CFG USING SVCENAME 50000".to_string()]);
                assert!(matches!(**source, Error::CommandFailed { code: 4, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.failed_command().unwrap().contains("UPDATE DBM CFG USING NUMDB 0;"));
        assert!(host.calls_containing("DFT_MON_SORT").is_empty());
    }

    #[test]
    fn test_apply_first_failure_is_plain() {
        let host = host().on_contains("UPDATE DBM CFG", CommandOutput::new(4, "", "boom"));
        let updates = vec![ConfigUpdate {
            name: "NUMDB".to_string(),
            value: "20".to_string(),
            automatic: false,
        }];
        let err = apply_updates(&host, "db2inst1", &updates).unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
    }
}
