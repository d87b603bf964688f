//! Scripted host for unit tests.

use crate::backend::Host;
use crate::error::Result;
use crate::types::CommandOutput;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A host that answers command lines from a script.
///
/// Responses are matched by exact command line first, then by the first
/// registered substring. Responses queued for the same key are consumed in
/// order; the last one repeats. Unknown commands succeed with empty output.
#[derive(Default)]
pub struct MockHost {
    exact: Mutex<HashMap<String, VecDeque<CommandOutput>>>,
    contains: Mutex<Vec<(String, VecDeque<CommandOutput>)>>,
    files: HashSet<PathBuf>,
    homes: HashMap<String, PathBuf>,
    user: Option<String>,
    root: bool,
    calls: Mutex<Vec<String>>,
}

impl MockHost {
    /// A root host with no files and no users.
    pub fn new() -> Self {
        Self {
            user: Some("root".to_string()),
            root: true,
            ..Default::default()
        }
    }

    /// Run as an unprivileged user.
    pub fn as_user(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self.root = false;
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into());
        self
    }

    pub fn with_home(mut self, user: &str, home: impl Into<PathBuf>) -> Self {
        self.homes.insert(user.to_string(), home.into());
        self
    }

    /// Answer `command_line` exactly.
    pub fn on(self, command_line: &str, output: CommandOutput) -> Self {
        self.exact
            .lock()
            .unwrap()
            .entry(command_line.to_string())
            .or_default()
            .push_back(output);
        self
    }

    /// Answer any command line containing `needle`.
    pub fn on_contains(self, needle: &str, output: CommandOutput) -> Self {
        {
            let mut contains = self.contains.lock().unwrap();
            if let Some((_, queue)) = contains.iter_mut().find(|(n, _)| n == needle) {
                queue.push_back(output);
            } else {
                contains.push((needle.to_string(), VecDeque::from([output])));
            }
        }
        self
    }

    /// Every command line run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Command lines run so far that contain `needle`.
    pub fn calls_containing(&self, needle: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.contains(needle))
            .collect()
    }
}

fn pop_or_repeat(queue: &mut VecDeque<CommandOutput>) -> CommandOutput {
    if queue.len() > 1 {
        queue.pop_front().unwrap_or_default()
    } else {
        queue.front().cloned().unwrap_or_default()
    }
}

impl Host for MockHost {
    fn run(&self, command_line: &str) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(command_line.to_string());

        if let Some(queue) = self.exact.lock().unwrap().get_mut(command_line) {
            return Ok(pop_or_repeat(queue));
        }
        let mut contains = self.contains.lock().unwrap();
        if let Some((_, queue)) = contains
            .iter_mut()
            .find(|(needle, _)| command_line.contains(needle.as_str()))
        {
            return Ok(pop_or_repeat(queue));
        }
        Ok(CommandOutput::ok(""))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn home_dir(&self, user: &str) -> Option<PathBuf> {
        self.homes.get(user).cloned()
    }

    fn current_user(&self) -> Option<String> {
        self.user.clone()
    }

    fn is_root(&self) -> bool {
        self.root
    }
}
