//! # db2kit
//!
//! Pure Rust library for discovering and converging Db2 instances.
//!
//! This crate provides functionality for:
//! - Parsing the output of `db2ls`, `db2ilist`, `GET DBM CFG` and
//!   `LIST DATABASE DIRECTORY`
//! - Gathering facts about installed software, instances and databases
//! - Creating, starting and dropping instances
//! - Converging DBM configuration parameters
//! - Running ad-hoc CLP statements as the instance owner
//!
//! ## Example
//!
//! ```no_run
//! use db2kit::{Client, ConfigParameter, InstanceSpec};
//!
//! let client = Client::new();
//!
//! let facts = client.facts(&[]).expect("Failed to gather facts");
//! if let Some(instances) = &facts.instances {
//!     for (name, info) in instances {
//!         println!("{name}: {}", info.path);
//!     }
//! }
//!
//! let spec = InstanceSpec::new("db2inst1")
//!     .with_path("/opt/ibm/db2/V11.5")
//!     .with_configuration(ConfigParameter::automatic("INSTANCE_MEMORY", "2000000"));
//! let result = client.reconcile(&spec).expect("Reconcile failed");
//! println!("changed: {}", result.changed);
//! ```

#![warn(clippy::all)]

pub mod backend;
pub mod clp;
pub mod error;
pub mod inventory;
pub mod lifecycle;
pub mod orchestrator;
pub mod parser;
pub mod privilege;
pub mod reconcile;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use clp::{ExecOutcome, ExecRequest};
pub use error::{Error, ErrorCategory, Result};
pub use inventory::{Inventory, InventoryConfig};
pub use lifecycle::{LifecycleAction, LifecycleState};
pub use privilege::Elevation;
pub use reconcile::ConfigUpdate;
pub use types::{
    CommandOutput, ConfigParameter, DatabaseEntry, FactFilter, Facts, InstanceInfo, InstanceSpec,
    ReconcileResult, SoftwareInfo, SoftwareInstallation, TargetState,
};

use backend::{Host, system::SystemHost};

/// High-level client for Db2 operations on one host.
pub struct Client {
    host: Box<dyn Host>,
    config: InventoryConfig,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Create a client for the local machine with default tool locations.
    pub fn new() -> Self {
        Self::with_host(Box::new(SystemHost::new()))
    }

    /// Create a client with a custom host (useful for testing).
    pub fn with_host(host: Box<dyn Host>) -> Self {
        Self {
            host,
            config: InventoryConfig::default(),
        }
    }

    /// Override discovery tool locations.
    pub fn with_config(mut self, config: InventoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    fn inventory(&self) -> Inventory<'_> {
        Inventory::new(self.host.as_ref(), &self.config)
    }

    // =========================================================================
    // Facts
    // =========================================================================

    /// Gather facts; an empty filter means all of them.
    pub fn facts(&self, filter: &[FactFilter]) -> Result<Facts> {
        self.inventory().facts(filter)
    }

    pub fn list_software(&self) -> Result<Vec<SoftwareInstallation>> {
        self.inventory().list_software()
    }

    pub fn list_instances(&self) -> Result<std::collections::BTreeMap<String, InstanceInfo>> {
        self.inventory().list_instances()
    }

    // =========================================================================
    // Convergence
    // =========================================================================

    /// How to reach the owner of `instance` from this process.
    pub fn elevation(&self, instance: &str) -> Elevation {
        Elevation::on_host(self.host.as_ref(), instance)
    }

    /// Converge one instance to its desired state.
    pub fn reconcile(&self, spec: &InstanceSpec) -> Result<ReconcileResult> {
        orchestrator::reconcile_instance(self.host.as_ref(), &self.config, spec)
    }

    /// Converge instances in order, stopping at the first failure.
    pub fn reconcile_all(&self, specs: &[InstanceSpec]) -> Result<Vec<ReconcileResult>> {
        orchestrator::reconcile_all(self.host.as_ref(), &self.config, specs)
    }

    /// Run a statement or statement file as the instance owner.
    pub fn exec(&self, request: &ExecRequest) -> Result<ExecOutcome> {
        clp::execute(self.host.as_ref(), request)
    }
}
