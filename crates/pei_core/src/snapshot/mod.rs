//! Portable snapshot of the joined view for backup and restore.
//!
//! # Responsibility
//! - Encode the joined view as pretty-printed JSON.
//! - Decode a snapshot into an upsert plan, rejecting malformed input
//!   before anything is written.
//! - Replay a plan against the status collection, one upsert at a time.
//!
//! # Invariants
//! - A snapshot is never authoritative; restore only issues upserts.
//! - Replay is not transactional: upserts before a failure stay committed.

use crate::model::status::{StatusEntry, StatusKey, Term};
use crate::model::view::JoinedStudentView;
use crate::repo::status_repo::StatusRepository;
use crate::repo::RepoError;
use log::{error, info};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod file_name;

#[derive(Debug)]
pub enum SnapshotError {
    /// Input is not an array of student objects.
    Malformed(String),
    Encode(serde_json::Error),
    /// An upsert failed mid-replay; `applied` upserts were committed before it.
    ReplayInterrupted {
        applied: usize,
        total: usize,
        key: StatusKey,
        source: RepoError,
    },
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(message) => write!(f, "malformed snapshot: {message}"),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
            Self::ReplayInterrupted {
                applied,
                total,
                key,
                source,
            } => write!(
                f,
                "snapshot replay stopped after {applied} of {total} upserts at student {} subject {}: {source}",
                key.student_id, key.subject_id
            ),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::ReplayInterrupted { source, .. } => Some(source),
            Self::Malformed(_) => None,
        }
    }
}

/// Serializes the full joined view.
pub fn export_snapshot(view: &[JoinedStudentView]) -> Result<String, SnapshotError> {
    serde_json::to_string_pretty(view).map_err(SnapshotError::Encode)
}

/// Parses a snapshot back into joined views.
///
/// # Errors
/// - `Malformed` when the text is not JSON, the top level is not an array,
///   an element is not an object, or an element does not decode.
pub fn decode_snapshot(text: &str) -> Result<Vec<JoinedStudentView>, SnapshotError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| SnapshotError::Malformed(format!("invalid JSON: {err}")))?;

    let items = value
        .as_array()
        .ok_or_else(|| SnapshotError::Malformed("top level must be an array".to_string()))?;
    if let Some(position) = items.iter().position(|item| !item.is_object()) {
        return Err(SnapshotError::Malformed(format!(
            "element {position} is not an object"
        )));
    }

    serde_json::from_value(value)
        .map_err(|err| SnapshotError::Malformed(format!("unexpected student shape: {err}")))
}

/// Flattens a snapshot into one upsert per nested entry.
///
/// Each upsert is keyed by the parent student's id, the entry's subject and
/// the entry's term, falling back to `current_term` for entries written
/// before term scoping.
pub fn plan_import(
    text: &str,
    current_term: Option<Term>,
) -> Result<Vec<StatusEntry>, SnapshotError> {
    let views = decode_snapshot(text)?;
    Ok(plan_upserts(&views, current_term))
}

/// One upsert per nested entry of `views`, in snapshot order.
pub fn plan_upserts(views: &[JoinedStudentView], current_term: Option<Term>) -> Vec<StatusEntry> {
    views
        .iter()
        .flat_map(|view| {
            view.statuses.iter().map(move |record| StatusEntry {
                student_id: view.student.id,
                subject_id: record.entry.subject_id,
                term: record.entry.term.or(current_term),
                status: record.entry.status,
            })
        })
        .collect()
}

/// Upserts `plan` in order, stopping at the first failure.
///
/// Returns the number of upserts applied.
pub fn replay<R: StatusRepository + ?Sized>(
    store: &R,
    plan: &[StatusEntry],
) -> Result<usize, SnapshotError> {
    for (applied, entry) in plan.iter().enumerate() {
        if let Err(source) = store.upsert_status(entry) {
            error!(
                "event=snapshot_replay module=snapshot status=error applied={} total={} error={}",
                applied,
                plan.len(),
                source
            );
            return Err(SnapshotError::ReplayInterrupted {
                applied,
                total: plan.len(),
                key: entry.key(),
                source,
            });
        }
    }
    info!(
        "event=snapshot_replay module=snapshot status=ok applied={}",
        plan.len()
    );
    Ok(plan.len())
}
