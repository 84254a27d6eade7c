//! Domain model for Chronos tasks, events and user profiles.
//!
//! # Responsibility
//! - Define canonical record shapes shared by storage, subscriptions and
//!   agenda grouping.
//! - Own record-level validation rules.
//!
//! # Invariants
//! - Every record is identified by a stable, non-nil `RecordId`.
//! - Every record belongs to exactly one `OwnerId`; ownership lives in
//!   storage, not in the record itself.
//! - Instants are Unix epoch milliseconds.

pub mod event;
pub mod profile;
pub mod record;
pub mod session;
pub mod task;
pub mod time;
