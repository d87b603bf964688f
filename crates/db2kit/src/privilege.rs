//! Running commands as the instance owner.
//!
//! Db2 administration commands must run with the instance owner's
//! environment. Depending on who invokes us, a command line is wrapped:
//!
//! | invoking user  | wrapping                                  |
//! |----------------|-------------------------------------------|
//! | the owner      | none                                      |
//! | root           | `/bin/su <owner> -c '<cmd>'`              |
//! | anyone else    | `/bin/sudo /bin/su <owner> -c '<cmd>'`    |

use crate::backend::Host;

/// How to reach the instance owner from the invoking user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elevation {
    /// Already running as the owner
    None,
    /// Running as root: switch user directly
    SwitchUser { owner: String },
    /// Escalate to root first, then switch user
    SudoSwitchUser { owner: String },
}

impl Elevation {
    /// Decide the elevation needed to act as `owner`.
    pub fn for_target(invoking_user: Option<&str>, is_root: bool, owner: &str) -> Self {
        if invoking_user == Some(owner) {
            Self::None
        } else if is_root {
            Self::SwitchUser {
                owner: owner.to_string(),
            }
        } else {
            Self::SudoSwitchUser {
                owner: owner.to_string(),
            }
        }
    }

    /// Decide the elevation for `owner` from what the host reports.
    pub fn on_host(host: &dyn Host, owner: &str) -> Self {
        Self::for_target(host.current_user().as_deref(), host.is_root(), owner)
    }

    /// Whether wrapping goes through sudo.
    pub fn needs_sudo(&self) -> bool {
        matches!(self, Self::SudoSwitchUser { .. })
    }

    /// Wrap a command line so it runs as the owner.
    pub fn wrap(&self, command_line: &str) -> String {
        match self {
            Self::None => command_line.to_string(),
            Self::SwitchUser { owner } => {
                format!("/bin/su {} -c {}", owner, quote_single(command_line))
            }
            Self::SudoSwitchUser { owner } => {
                format!("/bin/sudo /bin/su {} -c {}", owner, quote_single(command_line))
            }
        }
    }
}

/// Prefix a command line with `/bin/sudo` unless the host already runs as
/// root. Instance creation and removal need root, not the owner.
pub fn as_root(host: &dyn Host, command_line: &str) -> String {
    if host.is_root() {
        command_line.to_string()
    } else {
        format!("/bin/sudo {command_line}")
    }
}

/// Quote a string as one single-quoted shell word.
pub fn quote_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Escape a string for use inside a double-quoted shell word.
pub fn escape_double(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
