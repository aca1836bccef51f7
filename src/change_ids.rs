// src/change_ids.rs

use crate::error::{Error, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Everything but unreserved characters gets escaped
const CHANGE_ID: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Expands a short `I...` change ID to `project~branch~id`. A backport can
/// share its change ID with master, so the short form is ambiguous on its own.
pub fn qualify(change_id: &str, project: &str, branch: &str) -> String {
    if change_id.starts_with('I') {
        format!("{project}~{branch}~{change_id}")
    } else {
        change_id.to_string()
    }
}

/// Qualified and percent-encoded, ready to drop into a review API path
pub fn normalize(change_id: &str, project: &str, branch: &str) -> String {
    utf8_percent_encode(&qualify(change_id, project, branch), CHANGE_ID).to_string()
}

/// Reads a change-id list file: one ID per line, `#` starts a comment line
pub fn read_list_file(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(text
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Builds the set of change IDs to query from a mix of literal IDs and list
/// files. Any entry naming an existing file is read as a list and never used
/// as an ID itself, even if it also looks like one.
pub fn collect(entries: &[String]) -> Result<BTreeSet<String>> {
    let mut files = BTreeSet::new();
    let mut ids = BTreeSet::new();

    for entry in entries {
        let path = Path::new(entry);
        if path.is_file() {
            ids.extend(read_list_file(path)?);
            files.insert(entry.clone());
        }
    }
    ids.extend(entries.iter().cloned());

    Ok(ids.difference(&files).cloned().collect())
}
