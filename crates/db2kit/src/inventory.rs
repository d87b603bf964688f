//! Inventory of Db2 software, instances and databases on a host.
//!
//! Nothing is cached: every call walks software → instances → databases
//! again by running the host's discovery tools.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::backend::Host;
use crate::clp::profile_path;
use crate::error::{Error, Result};
use crate::parser::{
    parse_database_directory, parse_instance_listing, parse_software_listing, software_map,
};
use crate::privilege::Elevation;
use crate::types::{DatabaseEntry, FactFilter, Facts, InstanceInfo, SoftwareInstallation};

/// Default location of `db2ls`.
pub const DEFAULT_DB2LS_PATH: &str = "/usr/local/bin/db2ls";

/// Database directory return codes that mean "no databases here".
///
/// - `SQL1057W`: the system database directory is empty
/// - `SQL1031N`: the database directory cannot be found
pub const EMPTY_DIRECTORY_CODES: [&str; 2] = ["SQL1057W", "SQL1031N"];

/// Locations of the discovery tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// Global installation lister
    pub db2ls_path: PathBuf,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            db2ls_path: PathBuf::from(DEFAULT_DB2LS_PATH),
        }
    }
}

impl InventoryConfig {
    pub fn with_db2ls(path: impl Into<PathBuf>) -> Self {
        Self {
            db2ls_path: path.into(),
        }
    }
}

/// Path of the instance lister of an installation.
pub fn db2ilist_path(software_path: &str) -> PathBuf {
    Path::new(software_path).join("bin").join("db2ilist")
}

/// Read-through queries against one host.
pub struct Inventory<'a> {
    host: &'a dyn Host,
    config: &'a InventoryConfig,
}

impl<'a> Inventory<'a> {
    pub fn new(host: &'a dyn Host, config: &'a InventoryConfig) -> Self {
        Self { host, config }
    }

    /// Installed software, in `db2ls` order.
    ///
    /// A missing `db2ls` means nothing is installed; a failing one is an
    /// error.
    pub fn list_software(&self) -> Result<Vec<SoftwareInstallation>> {
        if !self.host.exists(&self.config.db2ls_path) {
            log::debug!(
                "{} not found, assuming no Db2 software",
                self.config.db2ls_path.display()
            );
            return Ok(Vec::new());
        }

        let command = format!("{} -c", self.config.db2ls_path.display());
        let output = self.host.run_checked(&command)?;
        Ok(parse_software_listing(&output.stdout))
    }

    /// Instances by name, with the installation that owns them.
    pub fn list_instances(&self) -> Result<BTreeMap<String, InstanceInfo>> {
        let software = self.list_software()?;
        self.instances_of(&software)
    }

    fn instances_of(
        &self,
        software: &[SoftwareInstallation],
    ) -> Result<BTreeMap<String, InstanceInfo>> {
        let mut instances = BTreeMap::new();

        for sw in software {
            let db2ilist = db2ilist_path(&sw.path);
            if !self.host.exists(&db2ilist) {
                return Err(Error::ToolMissing { path: db2ilist });
            }

            let output = self.host.run_checked(&db2ilist.display().to_string())?;
            for name in parse_instance_listing(&output.stdout) {
                instances.insert(
                    name,
                    InstanceInfo {
                        path: sw.path.clone(),
                    },
                );
            }
        }

        Ok(instances)
    }

    /// Local databases keyed `<instance>_<database name>`.
    pub fn list_databases(&self) -> Result<BTreeMap<String, DatabaseEntry>> {
        let instances = self.list_instances()?;
        self.databases_of(&instances)
    }

    fn databases_of(
        &self,
        instances: &BTreeMap<String, InstanceInfo>,
    ) -> Result<BTreeMap<String, DatabaseEntry>> {
        let mut databases = BTreeMap::new();

        for (instance, info) in instances {
            let profile = match profile_path(self.host, instance) {
                Ok(p) if self.host.exists(&p) => p,
                _ => {
                    log::debug!("no db2profile for instance {instance}, skipping databases");
                    continue;
                }
            };

            let script = format!(
                ". {}; LANG=C db2 list database directory",
                profile.display()
            );
            let command = Elevation::on_host(self.host, instance).wrap(&script);
            let output = self.host.run(&command)?;

            if !output.success() {
                if EMPTY_DIRECTORY_CODES
                    .iter()
                    .any(|code| output.stdout.contains(code))
                {
                    log::debug!("instance {instance} has no databases");
                    continue;
                }
                return Err(Error::command_failed(command, &output));
            }

            for entry in parse_database_directory(&output.stdout) {
                let entry = DatabaseEntry {
                    database_alias: entry.alias,
                    database_name: entry.name,
                    instance_name: instance.clone(),
                    instance_path: info.path.clone(),
                };
                databases.insert(entry.key(), entry);
            }
        }

        Ok(databases)
    }

    /// Gather the requested facts; an empty filter means everything.
    ///
    /// Each subset is derived once: software feeds instances, instances
    /// feed databases.
    pub fn facts(&self, filter: &[FactFilter]) -> Result<Facts> {
        let wants = |f: FactFilter| filter.is_empty() || filter.contains(&f);
        let mut facts = Facts::default();

        let software = self.list_software()?;
        if wants(FactFilter::Software) {
            facts.software = Some(software_map(&software));
        }

        if wants(FactFilter::Instances) || wants(FactFilter::Databases) {
            let instances = self.instances_of(&software)?;
            if wants(FactFilter::Databases) {
                facts.databases = Some(self.databases_of(&instances)?);
            }
            if wants(FactFilter::Instances) {
                facts.instances = Some(instances);
            }
        }

        Ok(facts)
    }
}
