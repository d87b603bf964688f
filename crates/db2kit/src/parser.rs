//! Parsers for Db2 administration tool output.
//!
//! All functions are pure and total: empty or unrecognised input yields an
//! empty result. Examples of the formats handled:
//!
//! ```text
//! # db2ls -c
//! #PATH:VRMF:FIXPACK:SPECIAL:INSTALLTIME:INSTALLERUID
//! /opt/ibm/db2/V11.5:11.5.8.0:8 :1:Thu Jul 13 15:28:23 2023 CEST :0
//!
//! # db2 get dbm cfg
//!  Number of FCM buffers                 (FCM_NUM_BUFFERS) = AUTOMATIC(1024)
//!  FCM buffer size                       (FCM_BUFFER_SIZE) = 32768
//!
//! # db2 list database directory
//!  Database 1 entry:
//!
//!  Database alias                       = SAMPLE
//!  Database name                        = SAMPLE
//!  Directory entry type                 = Indirect
//! ```

use crate::types::{DirectoryEntry, SoftwareInfo, SoftwareInstallation, SqlCodeTally};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static CONFIG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.* \(([^()]+)\) =\s?(.*)$").expect("valid regex"));

static DB_ENTRY_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Database \d+ entry:\s*$").expect("valid regex"));

static DB_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+Database name\s+=\s*(.*)$").expect("valid regex"));

static DB_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+Database alias\s+=\s*(.*)$").expect("valid regex"));

static DB_ENTRY_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+Directory entry type\s+=\s*(.*)$").expect("valid regex"));

static SQL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(SQL\d+N) ").expect("valid regex"));

/// Parse `db2ls -c` output into installations, in listing order.
///
/// Only the first four colon-separated fields are read. The install time
/// column contains colons itself, so nothing after `special` is trusted.
pub fn parse_software_listing(text: &str) -> Vec<SoftwareInstallation> {
    text.lines()
        .filter(|line| !line.starts_with('#') && line.starts_with('/'))
        .map(|line| {
            let mut fields = line.split(':');
            let mut next = || fields.next().unwrap_or_default().to_string();
            SoftwareInstallation {
                path: next(),
                vrmf: next(),
                fixpack: next(),
                special: next(),
            }
        })
        .collect()
}

/// Key installations by path. Later duplicates win.
pub fn software_map(listing: &[SoftwareInstallation]) -> BTreeMap<String, SoftwareInfo> {
    listing
        .iter()
        .map(|sw| (sw.path.clone(), SoftwareInfo::from(sw)))
        .collect()
}

/// Parse `db2ilist` output: one instance name per non-empty line.
pub fn parse_instance_listing(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `GET DBM CFG` output into `NAME -> raw value`.
///
/// Values are kept as printed, `AUTOMATIC(n)` wrapper included.
pub fn parse_configuration_snapshot(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| CONFIG_LINE.captures(line))
        .map(|caps| {
            (
                caps[1].trim().to_uppercase(),
                caps[2].trim_end().to_string(),
            )
        })
        .collect()
}

/// Parse `LIST DATABASE DIRECTORY` output into local (`Indirect`) entries.
pub fn parse_database_directory(text: &str) -> Vec<DirectoryEntry> {
    let mut entries = Vec::new();
    let mut name = String::new();
    let mut alias = String::new();

    for line in text.lines() {
        if DB_ENTRY_HEADER.is_match(line) {
            name.clear();
            alias.clear();
        } else if let Some(caps) = DB_NAME.captures(line) {
            name = caps[1].trim().to_string();
        } else if let Some(caps) = DB_ALIAS.captures(line) {
            alias = caps[1].trim().to_string();
        } else if let Some(caps) = DB_ENTRY_TYPE.captures(line)
            && caps[1].trim() == "Indirect"
        {
            entries.push(DirectoryEntry {
                alias: std::mem::take(&mut alias),
                name: std::mem::take(&mut name),
            });
        }
    }

    entries
}

/// Count SQL return codes (`SQLnnnnN`) that start a line.
pub fn extract_sql_codes(text: &str) -> SqlCodeTally {
    let mut tally = SqlCodeTally::new();
    for line in text.lines() {
        if let Some(caps) = SQL_CODE.captures(line) {
            *tally.entry(caps[1].to_string()).or_insert(0) += 1;
        }
    }
    tally
}
