//! Path resolution for db2ctl
//!
//! # Environment Variables
//!
//! - `DB2CTL_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/db2ctl`)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `DB2CTL_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/db2ctl` (if set)
//! 3. `~/.config/db2ctl`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "DB2CTL_CONFIG_DIR";

/// Name of the desired-state file inside the config directory
pub const DESIRED_STATE_FILE: &str = "instances.toml";

/// Get the db2ctl config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("db2ctl");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("db2ctl");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Default location of the desired-state file
pub fn desired_state_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(DESIRED_STATE_FILE))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================
