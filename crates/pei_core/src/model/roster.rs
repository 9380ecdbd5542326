//! Roster records: students and subjects.
//!
//! Both are created by external tooling and treated as read-only while a
//! tracker session is running.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StudentId = Uuid;
pub type SubjectId = Uuid;

/// One student on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    /// Display name.
    pub name: String,
    /// Free-text class label, e.g. `7A`. Grouping key for reports.
    pub class_label: String,
    /// Optional segment tag. Opaque to the tracker.
    #[serde(default)]
    pub segment: Option<String>,
}

impl Student {
    /// Creates a student with a generated id and no segment.
    pub fn new(name: impl Into<String>, class_label: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, class_label)
    }

    /// Creates a student with an id that already exists elsewhere.
    pub fn with_id(id: StudentId, name: impl Into<String>, class_label: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            class_label: class_label.into(),
            segment: None,
        }
    }

    /// Checks the fields the store refuses to persist.
    pub fn validate(&self) -> Result<(), RosterValidationError> {
        if self.name.trim().is_empty() {
            return Err(RosterValidationError::EmptyStudentName);
        }
        if self.class_label.trim().is_empty() {
            return Err(RosterValidationError::EmptyClassLabel);
        }
        Ok(())
    }
}

/// Subject reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    /// Total order among subjects for rendering and grouping.
    pub display_order: i64,
}

impl Subject {
    pub fn new(name: impl Into<String>, display_order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            display_order,
        }
    }

    pub fn validate(&self) -> Result<(), RosterValidationError> {
        if self.name.trim().is_empty() {
            return Err(RosterValidationError::EmptySubjectName);
        }
        Ok(())
    }

    /// Display metadata carried alongside status entries.
    pub fn meta(&self) -> SubjectMeta {
        SubjectMeta {
            name: self.name.clone(),
            display_order: self.display_order,
        }
    }
}

/// Subject display metadata joined onto a status entry at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectMeta {
    pub name: String,
    pub display_order: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterValidationError {
    EmptyStudentName,
    EmptyClassLabel,
    EmptySubjectName,
}

impl Display for RosterValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStudentName => write!(f, "student name cannot be empty"),
            Self::EmptyClassLabel => write!(f, "student class label cannot be empty"),
            Self::EmptySubjectName => write!(f, "subject name cannot be empty"),
        }
    }
}

impl Error for RosterValidationError {}
