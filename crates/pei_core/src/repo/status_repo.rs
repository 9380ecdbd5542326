//! Status-entry collection with subject metadata joined on read.

use super::{parse_uuid, RepoError, RepoResult, SqliteRecordStore};
use crate::model::roster::{StudentId, SubjectMeta};
use crate::model::status::{Status, StatusEntry, StatusKey, StatusRecord, Term, TermMode};
use log::warn;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

/// Stored `term` value for entries that are not term-scoped.
const NO_TERM: i64 = 0;

/// Filter for status-entry reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusListQuery {
    /// Restrict to entries written under this mode. `None` reads all terms.
    pub term_mode: Option<TermMode>,
    pub student_id: Option<StudentId>,
}

/// Read and upsert access to status entries.
pub trait StatusRepository {
    /// Entries ordered by subject display order (unknown subjects as `0`).
    fn list_status_entries(&self, query: &StatusListQuery) -> RepoResult<Vec<StatusRecord>>;
    /// Raw stored label for `key`, without interpretation.
    fn get_status_label(&self, key: &StatusKey) -> RepoResult<Option<String>>;
    /// Inserts or overwrites the entry with the same composite key.
    fn upsert_status(&self, entry: &StatusEntry) -> RepoResult<()>;
}

impl StatusRepository for SqliteRecordStore<'_> {
    fn list_status_entries(&self, query: &StatusListQuery) -> RepoResult<Vec<StatusRecord>> {
        let mut sql = String::from(
            "SELECT
                se.student_id,
                se.subject_id,
                se.term,
                se.status,
                sub.name AS subject_name,
                sub.display_order AS subject_order
             FROM status_entries se
             LEFT JOIN subjects sub ON sub.id = se.subject_id
             WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(mode) = query.term_mode {
            sql.push_str(" AND se.term = ?");
            bind_values.push(Value::Integer(term_to_db(mode.term())));
        }
        if let Some(student_id) = query.student_id {
            sql.push_str(" AND se.student_id = ?");
            bind_values.push(Value::Text(student_id.to_string()));
        }
        sql.push_str(" ORDER BY COALESCE(sub.display_order, 0) ASC, se.rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_status_row(row)?);
        }
        Ok(records)
    }

    fn get_status_label(&self, key: &StatusKey) -> RepoResult<Option<String>> {
        let label = self
            .conn
            .query_row(
                "SELECT status FROM status_entries
                 WHERE student_id = ?1 AND subject_id = ?2 AND term = ?3;",
                params![
                    key.student_id.to_string(),
                    key.subject_id.to_string(),
                    term_to_db(key.term),
                ],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(label)
    }

    fn upsert_status(&self, entry: &StatusEntry) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO status_entries (student_id, subject_id, term, status)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (student_id, subject_id, term) DO UPDATE SET
                status = excluded.status,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                entry.student_id.to_string(),
                entry.subject_id.to_string(),
                term_to_db(entry.term),
                entry.status.as_str(),
            ],
        )?;
        Ok(())
    }
}

fn parse_status_row(row: &Row<'_>) -> RepoResult<StatusRecord> {
    let student_id: String = row.get("student_id")?;
    let subject_id: String = row.get("subject_id")?;
    let term = term_from_db(row.get("term")?)?;

    let label: String = row.get("status")?;
    let status = Status::from_label(&label).unwrap_or_else(|| {
        warn!(
            "event=status_label_unknown module=repo status=degraded label={} fallback={}",
            label,
            Status::NotStarted
        );
        Status::NotStarted
    });

    let subject = match row.get::<_, Option<String>>("subject_name")? {
        Some(name) => Some(SubjectMeta {
            name,
            display_order: row.get("subject_order")?,
        }),
        None => None,
    };

    Ok(StatusRecord {
        entry: StatusEntry {
            student_id: parse_uuid(&student_id, "status_entries.student_id")?,
            subject_id: parse_uuid(&subject_id, "status_entries.subject_id")?,
            term,
            status,
        },
        subject,
    })
}

fn term_to_db(term: Option<Term>) -> i64 {
    term.map_or(NO_TERM, |term| i64::from(term.number()))
}

fn term_from_db(value: i64) -> RepoResult<Option<Term>> {
    if value == NO_TERM {
        return Ok(None);
    }
    u8::try_from(value)
        .ok()
        .and_then(Term::from_number)
        .map(Some)
        .ok_or_else(|| {
            RepoError::InvalidData(format!("invalid term `{value}` in status_entries.term"))
        })
}
