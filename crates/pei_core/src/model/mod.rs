//! Domain records shared by the store, the tracker and the codecs.
//!
//! # Responsibility
//! - Define roster records (students, subjects) and status entries.
//! - Define the joined per-student projection rendered by callers.
//!
//! # Invariants
//! - Students and subjects are identified by stable UUIDs.
//! - A status entry is identified by (student, subject, term).

pub mod roster;
pub mod status;
pub mod view;
