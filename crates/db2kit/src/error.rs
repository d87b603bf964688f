//! Error types for Db2 reconciliation.
//!
//! Every variant here is a hard failure: it aborts the run. Soft outcomes
//! (a missing discovery tool, an empty database directory, a logfile that
//! could not be written) never surface as an [`Error`]; they produce an
//! empty or reduced result instead.

use std::path::PathBuf;
use thiserror::Error;

/// Categories of errors for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A tool that must exist in the established context is absent
    ToolMissing,
    /// An administration command exited unsuccessfully
    CommandFailed,
    /// The instance owner's process list could not be read
    ProcessList,
    /// The desired state is not valid against the host
    InvalidInput,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ToolMissing => "Administration tool not found",
            Self::CommandFailed => "Administration command failed",
            Self::ProcessList => "Process list unreadable",
            Self::InvalidInput => "Invalid desired state",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::ToolMissing => "Check that the Db2 installation path is complete",
            Self::CommandFailed => "Inspect the command output below and the db2diag log",
            Self::ProcessList => "Verify that the instance owner exists and `ps` is available",
            Self::InvalidInput => "Fix the desired state (path, parameter names) and rerun",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur while discovering or converging Db2 state.
#[derive(Debug, Error)]
pub enum Error {
    /// A tool expected at a fixed location is missing
    #[error("tool not found: {}", path.display())]
    ToolMissing {
        /// Where the tool was expected
        path: PathBuf,
    },

    /// An administration command exited non-zero
    #[error("command failed (rc {code}): {command}\nstdout: {stdout}\nstderr: {stderr}")]
    CommandFailed {
        /// The full command line that was run
        command: String,
        /// Exit code
        code: i32,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// The process list of an instance owner could not be read
    #[error("could not read process list of user {user} (rc {code}): {stderr}")]
    ProcessListUnreadable {
        /// Instance owner
        user: String,
        /// Exit code of the listing command
        code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// A desired parameter is not part of the instance configuration
    #[error("unknown configuration parameter {name} for instance {instance}")]
    UnknownParameter {
        /// Instance name
        instance: String,
        /// Uppercased parameter name
        name: String,
    },

    /// A configuration update failed after earlier updates were applied
    #[error("{source} ({} update(s) applied before the failure)", applied.len())]
    PartiallyApplied {
        /// Update commands that succeeded before the failure
        applied: Vec<String>,
        /// The failure that aborted the batch
        #[source]
        source: Box<Error>,
    },

    /// Instance creation requested without an installation path
    #[error("instance {instance} does not exist and no installation path was given")]
    MissingInstallPath {
        /// Instance name
        instance: String,
    },

    /// The instance owner has no home directory entry
    #[error("no home directory found for user {user}")]
    HomeNotFound {
        /// Instance owner
        user: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::CommandFailed`] from a finished command.
    pub fn command_failed(command: impl Into<String>, output: &crate::CommandOutput) -> Self {
        Error::CommandFailed {
            command: command.into(),
            code: output.code,
            stdout: output.stdout.clone(),
            stderr: output.stderr.clone(),
        }
    }

    /// Get the error category for reporting.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::ToolMissing { .. } => ErrorCategory::ToolMissing,
            Error::CommandFailed { .. } => ErrorCategory::CommandFailed,
            Error::ProcessListUnreadable { .. } => ErrorCategory::ProcessList,
            Error::UnknownParameter { .. }
            | Error::MissingInstallPath { .. }
            | Error::HomeNotFound { .. } => ErrorCategory::InvalidInput,
            Error::PartiallyApplied { source, .. } => source.category(),
            Error::Io(_) => ErrorCategory::Other,
        }
    }

    /// The command line that failed, if this error carries one.
    pub fn failed_command(&self) -> Option<&str> {
        match self {
            Error::CommandFailed { command, .. } => Some(command),
            Error::PartiallyApplied { source, .. } => source.failed_command(),
            _ => None,
        }
    }
}

/// Result type for Db2 operations.
pub type Result<T> = std::result::Result<T, Error>;
