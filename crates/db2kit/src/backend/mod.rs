//! Host abstraction for Db2 reconciliation.
//!
//! The [`Host`] trait is the only way the core touches the machine:
//! running command lines, checking that a file exists and looking up
//! users. Implementations:
//! - [`system::SystemHost`]: the real machine (`/bin/sh -c`, passwd)
//! - `testing::MockHost`: scripted responses for unit tests

pub mod system;

use crate::error::Result;
use crate::types::CommandOutput;
use std::path::{Path, PathBuf};

/// Backend trait for everything the core needs from the host.
pub trait Host: Send + Sync {
    /// Run a shell command line to completion and capture its output.
    ///
    /// A non-zero exit is reported through [`CommandOutput::code`], not as
    /// an error. Errors mean the command could not be started at all.
    fn run(&self, command_line: &str) -> Result<CommandOutput>;

    /// Check whether a regular file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Home directory of an OS user, if the user exists.
    fn home_dir(&self, user: &str) -> Option<PathBuf>;

    /// Name of the user this process runs as.
    fn current_user(&self) -> Option<String>;

    /// Whether this process runs with root privileges.
    fn is_root(&self) -> bool;

    /// Run a command line and fail on a non-zero exit.
    fn run_checked(&self, command_line: &str) -> Result<CommandOutput> {
        let output = self.run(command_line)?;
        if !output.success() {
            return Err(crate::Error::command_failed(command_line, &output));
        }
        Ok(output)
    }
}
