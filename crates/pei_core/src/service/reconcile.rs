//! Pure join of students and status entries.

use crate::model::roster::{Student, StudentId};
use crate::model::status::StatusRecord;
use crate::model::view::JoinedStudentView;
use std::collections::HashMap;

/// Joins `students` with their `entries`.
///
/// # Contract
/// - One view per student, in the order `students` was given.
/// - Each view holds exactly the entries whose `student_id` matches, in the
///   order they appear in `entries`.
/// - Entries for students not in `students` are dropped from the view; they
///   remain in the store.
/// - Entries with unknown subjects are kept with `subject = None`.
/// - A student listed twice gets the same entries in both views.
pub fn reconcile(students: Vec<Student>, entries: Vec<StatusRecord>) -> Vec<JoinedStudentView> {
    let mut by_student: HashMap<StudentId, Vec<StatusRecord>> = HashMap::new();
    for record in entries {
        by_student
            .entry(record.entry.student_id)
            .or_default()
            .push(record);
    }

    students
        .into_iter()
        .map(|student| {
            let statuses = by_student.get(&student.id).cloned().unwrap_or_default();
            JoinedStudentView { student, statuses }
        })
        .collect()
}
