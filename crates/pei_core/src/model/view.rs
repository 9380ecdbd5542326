//! Joined per-student projection.
//!
//! A `JoinedStudentView` is derived from the two store collections on every
//! load and never persisted. Only the tracker mutates it, and only after
//! the store confirmed the write.

use crate::model::roster::{Student, SubjectId};
use crate::model::status::{StatusRecord, Term};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedStudentView {
    #[serde(flatten)]
    pub student: Student,
    /// Entries ordered by subject display order.
    #[serde(default)]
    pub statuses: Vec<StatusRecord>,
}

impl JoinedStudentView {
    pub fn find_status(&self, subject_id: SubjectId, term: Option<Term>) -> Option<&StatusRecord> {
        self.statuses
            .iter()
            .find(|record| record.entry.subject_id == subject_id && record.entry.term == term)
    }

    pub(crate) fn find_status_mut(
        &mut self,
        subject_id: SubjectId,
        term: Option<Term>,
    ) -> Option<&mut StatusRecord> {
        self.statuses
            .iter_mut()
            .find(|record| record.entry.subject_id == subject_id && record.entry.term == term)
    }

    /// Inserts `record` after every entry whose order key is not greater,
    /// keeping the list in display order.
    pub(crate) fn insert_ordered(&mut self, record: StatusRecord) {
        let key = record.order_key();
        let at = self
            .statuses
            .iter()
            .position(|existing| existing.order_key() > key)
            .unwrap_or(self.statuses.len());
        self.statuses.insert(at, record);
    }

    /// Entries not yet `Done`, sorted by subject display order.
    pub fn incomplete(&self) -> Vec<&StatusRecord> {
        let mut pending: Vec<&StatusRecord> = self
            .statuses
            .iter()
            .filter(|record| record.is_incomplete())
            .collect();
        pending.sort_by_key(|record| record.order_key());
        pending
    }
}
