//! Tracker use-cases over the record store.
//!
//! # Responsibility
//! - Join the roster and status collections into the per-student view.
//! - Advance statuses around the ring with write-then-reflect ordering.
//! - Render pending-work reports and hand them to delivery channels.
//!
//! # Invariants
//! - The joined view is owned by exactly one `PeiTracker`.
//! - The view changes only after the store confirmed the write.

pub mod delivery;
pub mod reconcile;
pub mod report;
pub mod status_cycle;
pub mod tracker;
