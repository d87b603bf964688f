//! Scoped sudo context
//!
//! Commands that must run as an instance owner are wrapped with
//! `/bin/sudo /bin/su <owner>` when the invoking user is neither root nor
//! the owner. Credentials are validated once up front so that the wrapped
//! commands never prompt, and invalidated again when the context drops.

use anyhow::{Context, Result, bail};
use db2kit::Client;
use std::process::Command;

/// Scoped sudo context - automatically invalidates on drop
pub struct SudoContext {
    _private: (),
}

impl SudoContext {
    /// Acquire sudo privileges with a reason shown to user
    pub fn acquire(reason: &str) -> Result<Self> {
        if Self::is_valid() {
            log::debug!("sudo credentials already cached");
            return Ok(Self { _private: () });
        }

        eprintln!();
        eprintln!("  Sudo required: {reason}");
        eprintln!();

        // Validate sudo (will prompt for password)
        let status = Command::new("sudo")
            .args(["-v"])
            .status()
            .context("Failed to execute sudo")?;

        if !status.success() {
            bail!("Failed to acquire sudo privileges");
        }

        Ok(Self { _private: () })
    }

    /// Check if sudo is currently valid (without prompting)
    pub fn is_valid() -> bool {
        Command::new("sudo")
            .args(["-n", "true"])
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Acquire sudo only if acting as any of `owners` goes through sudo
    pub fn for_owners<'a>(
        client: &Client,
        owners: impl IntoIterator<Item = &'a str>,
    ) -> Result<Option<Self>> {
        let needing: Vec<&str> = owners
            .into_iter()
            .filter(|owner| client.elevation(owner).needs_sudo())
            .collect();

        if needing.is_empty() {
            return Ok(None);
        }

        let reason = format!("run Db2 commands as {}", needing.join(", "));
        Self::acquire(&reason).map(Some)
    }

    /// Acquire sudo for convergence: `db2icrt`/`db2idrop` need root, and
    /// the owners may be reached through sudo as well.
    pub fn for_lifecycle<'a>(
        client: &Client,
        owners: impl IntoIterator<Item = &'a str>,
    ) -> Result<Option<Self>> {
        if client.host().is_root() {
            return Self::for_owners(client, owners);
        }
        let owners: Vec<&str> = owners.into_iter().collect();
        let reason = format!("create, drop or configure Db2 instances {}", owners.join(", "));
        Self::acquire(&reason).map(Some)
    }
}

impl Drop for SudoContext {
    fn drop(&mut self) {
        // Invalidate sudo timestamp to release privileges
        let _ = Command::new("sudo").args(["-k"]).status();
    }
}
