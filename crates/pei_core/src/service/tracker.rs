//! Owner of the joined view and entry point for tracker use-cases.
//!
//! # Responsibility
//! - Load the view from the record store through `reconcile`.
//! - Advance one entry with write-then-reflect ordering.
//! - Produce reports and snapshots from the loaded view.
//!
//! # Invariants
//! - `view` is only replaced by `load` and only patched by `advance`.
//! - `advance` patches the view strictly after a successful upsert; any
//!   store failure leaves the view untouched.

use crate::model::roster::{StudentId, SubjectId, SubjectMeta};
use crate::model::status::{StatusEntry, StatusKey, StatusRecord, Term, TermMode};
use crate::model::view::JoinedStudentView;
use crate::repo::roster_repo::{RosterRepository, StudentListQuery};
use crate::repo::status_repo::{StatusListQuery, StatusRepository};
use crate::repo::RepoError;
use crate::service::reconcile::reconcile;
use crate::service::report::{generate_report, ReportGrouping, ReportOutcome, ReportRequest};
use crate::service::status_cycle::next_status;
use crate::snapshot::{decode_snapshot, export_snapshot, plan_upserts, replay, SnapshotError};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Recoverable failure of one tracker operation.
#[derive(Debug)]
pub enum TrackerError {
    Store(RepoError),
    Snapshot(SnapshotError),
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Snapshot(err) => Some(err),
        }
    }
}

impl From<RepoError> for TrackerError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

impl From<SnapshotError> for TrackerError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

/// Outcome of a snapshot restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub students: usize,
    pub upserts_applied: usize,
}

/// Single in-process owner of the joined view.
pub struct PeiTracker<R> {
    store: R,
    term_mode: TermMode,
    view: Vec<JoinedStudentView>,
}

impl<R: RosterRepository + StatusRepository> PeiTracker<R> {
    /// Creates a tracker with an empty view. Call `load` before rendering.
    pub fn new(store: R, term_mode: TermMode) -> Self {
        Self {
            store,
            term_mode,
            view: Vec::new(),
        }
    }

    pub fn term_mode(&self) -> TermMode {
        self.term_mode
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub fn view(&self) -> &[JoinedStudentView] {
        &self.view
    }

    /// Rebuilds the view from both collections.
    ///
    /// On failure the previous view is kept as it was.
    pub fn load(&mut self) -> TrackerResult<&[JoinedStudentView]> {
        let started_at = Instant::now();
        let fetched = self
            .store
            .list_students(&StudentListQuery::default())
            .and_then(|students| {
                let entries = self.store.list_status_entries(&StatusListQuery {
                    term_mode: Some(self.term_mode),
                    student_id: None,
                })?;
                Ok((students, entries))
            });

        let (students, entries) = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                error!(
                    "event=view_load module=tracker status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        let entry_count = entries.len();
        self.view = reconcile(students, entries);
        info!(
            "event=view_load module=tracker status=ok term_mode={} students={} entries={} duration_ms={}",
            self.term_mode,
            self.view.len(),
            entry_count,
            started_at.elapsed().as_millis()
        );
        Ok(&self.view)
    }

    /// Distinct class labels in view order.
    pub fn class_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for view in &self.view {
            let label = view.student.class_label.as_str();
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    /// Views for one class, or all of them when `class_label` is `None`.
    pub fn students_in_class(&self, class_label: Option<&str>) -> Vec<&JoinedStudentView> {
        self.view
            .iter()
            .filter(|view| class_label.map_or(true, |label| view.student.class_label == label))
            .collect()
    }

    /// Moves one entry to the next status around the ring.
    ///
    /// # Contract
    /// - Reads the stored status; an absent entry counts as `NotStarted`.
    /// - Upserts on (student, subject, active term).
    /// - Patches the matching view entry only after the upsert returned.
    ///   An entry missing from the view is inserted in display order.
    ///
    /// # Errors
    /// - `TrackerError::Store` on any read or write failure. The view is not
    ///   modified and nothing is retried.
    pub fn advance(
        &mut self,
        student_id: StudentId,
        subject_id: SubjectId,
    ) -> TrackerResult<StatusEntry> {
        let started_at = Instant::now();
        let key = StatusKey {
            student_id,
            subject_id,
            term: self.term_mode.term(),
        };

        match self.persist_next(&key) {
            Ok((entry, subject)) => {
                self.reflect(&entry, subject);
                info!(
                    "event=status_advance module=tracker status=ok student_id={} subject_id={} new_status={} duration_ms={}",
                    student_id,
                    subject_id,
                    entry.status,
                    started_at.elapsed().as_millis()
                );
                Ok(entry)
            }
            Err(err) => {
                error!(
                    "event=status_advance module=tracker status=error student_id={} subject_id={} duration_ms={} error={}",
                    student_id,
                    subject_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Renders a report over the loaded view.
    pub fn report(&self, grouping: ReportGrouping, class_filter: Option<&str>) -> ReportOutcome {
        let request = ReportRequest {
            grouping,
            class_filter: class_filter.map(str::to_string),
            term: self.term_mode.term(),
            title: None,
        };
        let outcome = generate_report(&self.view, &request);
        info!(
            "event=report_generate module=tracker status=ok grouping={} sections={} fully_complete={}",
            grouping,
            outcome.sections().len(),
            outcome.is_fully_complete()
        );
        outcome
    }

    /// Serializes the loaded view.
    pub fn export_snapshot(&self) -> TrackerResult<String> {
        let text = export_snapshot(&self.view)?;
        info!(
            "event=snapshot_export module=tracker status=ok students={} bytes={}",
            self.view.len(),
            text.len()
        );
        Ok(text)
    }

    /// Replays every entry of a snapshot as an upsert.
    ///
    /// `current_term` is stamped onto entries that carry no term. The view is
    /// not refreshed; call `load` afterwards.
    ///
    /// # Errors
    /// - `SnapshotError::Malformed` before any write.
    /// - `SnapshotError::ReplayInterrupted` after a partial replay.
    pub fn import_snapshot(
        &mut self,
        text: &str,
        current_term: Option<Term>,
    ) -> TrackerResult<ImportSummary> {
        let views = decode_snapshot(text).map_err(|err| {
            error!("event=snapshot_import module=tracker status=error stage=decode error={err}");
            err
        })?;
        let plan = plan_upserts(&views, current_term);
        let upserts_applied = replay(&self.store, &plan)?;
        info!(
            "event=snapshot_import module=tracker status=ok students={} upserts={}",
            views.len(),
            upserts_applied
        );
        Ok(ImportSummary {
            students: views.len(),
            upserts_applied,
        })
    }

    fn persist_next(
        &self,
        key: &StatusKey,
    ) -> Result<(StatusEntry, Option<SubjectMeta>), RepoError> {
        let stored = self.store.get_status_label(key)?;
        let status = next_status(stored.as_deref());

        let in_view = self
            .view
            .iter()
            .find(|view| view.student.id == key.student_id)
            .map(|view| view.find_status(key.subject_id, key.term).is_some());
        let subject = match in_view {
            Some(false) => self.store.get_subject(key.subject_id)?.map(|s| s.meta()),
            _ => None,
        };

        let entry = StatusEntry {
            student_id: key.student_id,
            subject_id: key.subject_id,
            term: key.term,
            status,
        };
        self.store.upsert_status(&entry)?;
        Ok((entry, subject))
    }

    fn reflect(&mut self, entry: &StatusEntry, subject: Option<SubjectMeta>) {
        let Some(view) = self
            .view
            .iter_mut()
            .find(|view| view.student.id == entry.student_id)
        else {
            debug!(
                "event=status_reflect module=tracker status=skipped reason=student_not_loaded student_id={}",
                entry.student_id
            );
            return;
        };

        match view.find_status_mut(entry.subject_id, entry.term) {
            Some(record) => record.entry.status = entry.status,
            None => view.insert_ordered(StatusRecord {
                entry: entry.clone(),
                subject,
            }),
        }
    }
}
