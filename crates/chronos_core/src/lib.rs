//! Core domain logic for Chronos, a task and calendar-event agenda.
//! This crate is the single source of truth for record invariants, the
//! live snapshot boundary and day bucketing.

pub mod agenda;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod source;

pub use agenda::feed::{AgendaFeed, AgendaState, FeedStatus};
pub use agenda::format::{
    card_summary, format_card_date, render_sections, CardBadge, CardSummary, SectionView,
    EMPTY_AGENDA_MESSAGE,
};
pub use agenda::group::{
    classify_day, group_by_day, group_by_day_now, AgendaItem, DayBucket, GroupedAgenda,
};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::event::{Event, EventPatch};
pub use model::profile::UserProfile;
pub use model::record::{ModelValidationError, OwnerId, RecordId};
pub use model::session::{Session, Unauthenticated};
pub use model::task::{Task, TaskPatch};
pub use repo::event_repo::{EventRepository, SqliteEventRepository};
pub use repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use service::account_service::{AccountService, RegisterProfileRequest};
pub use service::clock::{Clock, FixedClock, SystemClock};
pub use service::event_service::{CreateEventRequest, EventService};
pub use service::task_service::{CreateTaskRequest, TaskService};
pub use service::{ServiceError, ServiceResult};
pub use source::{RecordSource, SnapshotHub, SourceError, SourceResult, Subscription};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
