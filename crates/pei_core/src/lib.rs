//! Status tracking and reporting engine for individualized education plans.
//!
//! The crate joins the roster with per-subject PEI status entries, moves
//! entries around the `NotStarted -> InReview -> Done` ring, renders
//! pending-work reports and round-trips the joined view through snapshots.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod snapshot;

pub use config::{resolve_db_path, ConfigError, TrackerConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::roster::{Student, StudentId, Subject, SubjectId, SubjectMeta};
pub use model::status::{Status, StatusEntry, StatusKey, StatusRecord, Term, TermMode};
pub use model::view::JoinedStudentView;
pub use repo::roster_repo::{RosterRepository, StudentListQuery};
pub use repo::status_repo::{StatusListQuery, StatusRepository};
pub use repo::{RepoError, RepoResult, SqliteRecordStore};
pub use service::delivery::{
    share_link, DeliveryError, ReportChannel, ShareLinkChannel, WriterChannel,
};
pub use service::reconcile::reconcile;
pub use service::report::{generate_report, ReportGrouping, ReportOutcome, ReportRequest};
pub use service::status_cycle::next_status;
pub use service::tracker::{ImportSummary, PeiTracker, TrackerError, TrackerResult};
pub use snapshot::file_name::{parse_snapshot_file_name, snapshot_file_name};
pub use snapshot::SnapshotError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
