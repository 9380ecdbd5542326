//! Record store contracts and their SQLite implementation.
//!
//! # Responsibility
//! - Define the two collection contracts the tracker depends on:
//!   roster reads (`RosterRepository`) and status reads/upserts
//!   (`StatusRepository`).
//! - Keep SQL inside this module.
//!
//! # Invariants
//! - Students are always returned ordered by class label, then name.
//! - Status entries are always returned ordered by subject display order,
//!   unknown subjects counting as order `0`.
//! - Status writes are upserts on (student, subject, term); no write path
//!   spans more than one record.

use crate::db::DbError;
use crate::model::roster::RosterValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod roster_repo;
pub mod status_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure of a record store read or write.
#[derive(Debug)]
pub enum RepoError {
    Validation(RosterValidationError),
    Db(DbError),
    InvalidData(String),
    /// The store could not be reached or refused the request.
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
            Self::Unavailable(message) => write!(f, "record store unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<RosterValidationError> for RepoError {
    fn from(value: RosterValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// SQLite-backed record store over a migrated connection.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<uuid::Uuid> {
    uuid::Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}
