//! Status entries and the closed status ring.
//!
//! # Invariants
//! - `Status` has exactly three values and no terminal state.
//! - At most one entry exists per `StatusKey`.
//! - `term = None` means the deployment does not scope status by term.

use crate::model::roster::{StudentId, SubjectId, SubjectMeta};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Completion status of one student's PEI for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    #[serde(alias = "Não Iniciado")]
    NotStarted,
    #[serde(alias = "Em Correção")]
    InReview,
    #[serde(alias = "Concluído")]
    Done,
}

impl Status {
    /// Next value around the ring `NotStarted -> InReview -> Done -> NotStarted`.
    pub fn next(self) -> Self {
        match self {
            Self::NotStarted => Self::InReview,
            Self::InReview => Self::Done,
            Self::Done => Self::NotStarted,
        }
    }

    pub fn is_done(self) -> bool {
        self == Self::Done
    }

    /// Stable storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InReview => "in_review",
            Self::Done => "done",
        }
    }

    /// Parses a storage label. Labels written by the legacy web client
    /// are accepted too.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "not_started" | "Não Iniciado" => Some(Self::NotStarted),
            "in_review" | "Em Correção" => Some(Self::InReview),
            "done" | "Concluído" => Some(Self::Done),
            _ => None,
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Academic term (bimestre). Four per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Term {
    First = 1,
    Second = 2,
    Third = 3,
    Fourth = 4,
}

impl Term {
    pub const ALL: [Term; 4] = [Term::First, Term::Second, Term::Third, Term::Fourth];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|term| term.number() == value)
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl From<Term> for u8 {
    fn from(value: Term) -> Self {
        value.number()
    }
}

impl TryFrom<u8> for Term {
    type Error = InvalidTerm;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or(InvalidTerm(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTerm(pub u8);

impl Display for InvalidTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid term `{}`; expected 1..=4", self.0)
    }
}

impl Error for InvalidTerm {}

/// Whether a deployment scopes status entries by term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TermMode {
    /// One status per (student, subject).
    #[default]
    Global,
    /// One status per (student, subject, term); this is the active term.
    Scoped(Term),
}

impl TermMode {
    /// Term stamped onto entries written under this mode.
    pub fn term(self) -> Option<Term> {
        match self {
            Self::Global => None,
            Self::Scoped(term) => Some(term),
        }
    }
}

impl Display for TermMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Scoped(term) => write!(f, "term {term}"),
        }
    }
}

/// Composite identity of a status entry; the upsert conflict target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusKey {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub term: Option<Term>,
}

/// One persisted status value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// Optional when nested in a snapshot; the parent student owns the key.
    #[serde(default)]
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    #[serde(default)]
    pub term: Option<Term>,
    pub status: Status,
}

impl StatusEntry {
    pub fn key(&self) -> StatusKey {
        StatusKey {
            student_id: self.student_id,
            subject_id: self.subject_id,
            term: self.term,
        }
    }
}

/// A status entry as read back from the store, with the subject's display
/// metadata when the subject is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(flatten)]
    pub entry: StatusEntry,
    #[serde(default)]
    pub subject: Option<SubjectMeta>,
}

impl StatusRecord {
    /// Sort key among a student's subjects. Unknown subjects sort as `0`.
    pub fn order_key(&self) -> i64 {
        self.subject.as_ref().map_or(0, |meta| meta.display_order)
    }

    /// Subject name, or a placeholder naming the id when metadata is missing.
    pub fn subject_label(&self) -> String {
        match &self.subject {
            Some(meta) => meta.name.clone(),
            None => format!("unknown subject {}", self.entry.subject_id),
        }
    }

    pub fn is_incomplete(&self) -> bool {
        !self.entry.status.is_done()
    }
}
