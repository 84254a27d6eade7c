//! Agenda: day bucketing, presentation model and live feed.
//!
//! # Responsibility
//! - Partition tasks and events into yesterday/today/tomorrow/others by
//!   local calendar day.
//! - Derive display-ready sections and card summaries.
//! - Combine the task and event channels into one regrouped view.
//!
//! # Invariants
//! - Grouping is pure: same records and same `now` give the same result.
//! - Records without a representable comparison date are excluded, never
//!   routed to `Others`.

pub mod feed;
pub mod format;
pub mod group;
