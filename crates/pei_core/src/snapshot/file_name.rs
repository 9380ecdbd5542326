//! Snapshot file naming.
//!
//! Format: `backup_pei_<dd-mm-yyyy>_<HHhMMhSS>[_b<term>].json`.

use crate::model::status::Term;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

static SNAPSHOT_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^backup_pei_(\d{2}-\d{2}-\d{4}_\d{2}h\d{2}h\d{2})(?:_b([1-4]))?\.json$")
        .expect("valid snapshot name regex")
});

const TIMESTAMP_FORMAT: &str = "%d-%m-%Y_%Hh%Mh%S";

/// Metadata recovered from a snapshot file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotFileInfo {
    pub taken_at: NaiveDateTime,
    pub term: Option<Term>,
}

/// File name for a snapshot taken at `taken_at`, tagged with `term` when the
/// deployment is term-scoped.
pub fn snapshot_file_name(taken_at: NaiveDateTime, term: Option<Term>) -> String {
    let stamp = taken_at.format(TIMESTAMP_FORMAT);
    match term {
        Some(term) => format!("backup_pei_{stamp}_b{term}.json"),
        None => format!("backup_pei_{stamp}.json"),
    }
}

/// Parses a name produced by `snapshot_file_name`. Returns `None` for any
/// other name.
pub fn parse_snapshot_file_name(name: &str) -> Option<SnapshotFileInfo> {
    let captures = SNAPSHOT_NAME_RE.captures(name.trim())?;
    let taken_at = NaiveDateTime::parse_from_str(&captures[1], TIMESTAMP_FORMAT).ok()?;
    let term = match captures.get(2) {
        Some(digit) => Some(Term::from_number(digit.as_str().parse().ok()?)?),
        None => None,
    };
    Some(SnapshotFileInfo { taken_at, term })
}
