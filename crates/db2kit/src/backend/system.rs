//! Local machine backend.
//!
//! Commands are handed to `/bin/sh -c` so that the composite invocations
//! built by [`crate::clp`] (profile sourcing, environment assignments,
//! `su -c` wrapping) behave exactly as they would in a login shell.
//! Nothing here imposes a timeout: a hanging tool hangs the run.

use std::ffi::{CStr, CString, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::Host;
use crate::error::Result;
use crate::types::CommandOutput;

/// Shell used to interpret command lines.
const SHELL: &str = "/bin/sh";

/// Host implementation for the machine this process runs on.
#[derive(Debug, Default)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }
}

impl Host for SystemHost {
    fn run(&self, command_line: &str) -> Result<CommandOutput> {
        log::debug!("run: {command_line}");
        let output = Command::new(SHELL).arg("-c").arg(command_line).output()?;
        let output = CommandOutput::from(output);
        log::trace!(
            "rc={} stdout={:?} stderr={:?}",
            output.code,
            output.stdout,
            output.stderr
        );
        Ok(output)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn home_dir(&self, user: &str) -> Option<PathBuf> {
        let name = CString::new(user).ok()?;

        // getpwnam returns a pointer into static storage; copy out before
        // any other passwd call.
        unsafe {
            let pw = libc::getpwnam(name.as_ptr());
            if pw.is_null() || (*pw).pw_dir.is_null() {
                return None;
            }
            let dir = CStr::from_ptr((*pw).pw_dir);
            Some(PathBuf::from(OsStr::from_bytes(dir.to_bytes())))
        }
    }

    fn current_user(&self) -> Option<String> {
        unsafe {
            let pw = libc::getpwuid(libc::geteuid());
            if pw.is_null() || (*pw).pw_name.is_null() {
                return None;
            }
            Some(CStr::from_ptr((*pw).pw_name).to_string_lossy().into_owned())
        }
    }

    fn is_root(&self) -> bool {
        unsafe { libc::geteuid() == 0 }
    }
}
