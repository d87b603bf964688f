//! Command implementations, one module per subcommand.

pub mod apply;
pub mod exec;
pub mod facts;
pub mod instance;

use db2kit::{Client, InventoryConfig};

/// Create a client for the local machine.
pub(crate) fn client(config: InventoryConfig) -> Client {
    log::debug!("db2ls: {}", config.db2ls_path.display());
    Client::new().with_config(config)
}
