//! Roster collection: students and subjects.

use super::{parse_uuid, RepoResult, SqliteRecordStore};
use crate::model::roster::{Student, StudentId, Subject, SubjectId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

/// Filter for student reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentListQuery {
    /// Exact class label match. `None` returns every class.
    pub class_label: Option<String>,
}

/// Read and seed access to the roster collections.
///
/// The tracker only reads through this trait; the create methods exist
/// for the external tooling that maintains the roster.
pub trait RosterRepository {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId>;
    /// Students ordered by class label, then name.
    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>>;
    fn create_subject(&self, subject: &Subject) -> RepoResult<SubjectId>;
    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>>;
    /// Subjects ordered by display order, then name.
    fn list_subjects(&self) -> RepoResult<Vec<Subject>>;
}

impl RosterRepository for SqliteRecordStore<'_> {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId> {
        student.validate()?;
        self.conn.execute(
            "INSERT INTO students (id, name, class_label, segment)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                student.id.to_string(),
                student.name.trim(),
                student.class_label.trim(),
                student.segment.as_deref(),
            ],
        )?;
        Ok(student.id)
    }

    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>> {
        let mut sql = String::from("SELECT id, name, class_label, segment FROM students");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(class_label) = &query.class_label {
            sql.push_str(" WHERE class_label = ?");
            bind_values.push(Value::Text(class_label.trim().to_string()));
        }
        sql.push_str(" ORDER BY class_label ASC, name ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn create_subject(&self, subject: &Subject) -> RepoResult<SubjectId> {
        subject.validate()?;
        self.conn.execute(
            "INSERT INTO subjects (id, name, display_order) VALUES (?1, ?2, ?3);",
            params![
                subject.id.to_string(),
                subject.name.trim(),
                subject.display_order
            ],
        )?;
        Ok(subject.id)
    }

    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, display_order FROM subjects WHERE id = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, name, display_order)| {
            Ok(Subject {
                id: parse_uuid(&id, "subjects.id")?,
                name,
                display_order,
            })
        })
        .transpose()
    }

    fn list_subjects(&self) -> RepoResult<Vec<Subject>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, display_order FROM subjects
             ORDER BY display_order ASC, name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get("id")?;
            subjects.push(Subject {
                id: parse_uuid(&id, "subjects.id")?,
                name: row.get("name")?,
                display_order: row.get("display_order")?,
            });
        }
        Ok(subjects)
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let id: String = row.get("id")?;
    Ok(Student {
        id: parse_uuid(&id, "students.id")?,
        name: row.get("name")?,
        class_label: row.get("class_label")?,
        segment: row.get("segment")?,
    })
}
