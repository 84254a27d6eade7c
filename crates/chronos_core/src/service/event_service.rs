//! Event use-case service.
//!
//! # Invariants
//! - Every successful mutation publishes the owner's full event list.
//! - All-day events keep their given start instant; bucketing only looks at
//!   its calendar day.

use crate::model::event::{Event, EventPatch};
use crate::model::record::{normalize_note, OwnerId, RecordId};
use crate::model::session::Session;
use crate::repo::event_repo::EventRepository;
use crate::service::clock::{system_clock, Clock};
use crate::service::{ServiceError, ServiceResult};
use crate::source::{RecordSource, SnapshotHub, SourceResult, Subscription};
use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Input for `EventService::create_event`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEventRequest {
    pub title: String,
    /// Start instant in epoch milliseconds.
    pub start: i64,
    /// Optional end instant in epoch milliseconds.
    pub end: Option<i64>,
    pub all_day: bool,
    pub note: Option<String>,
}

impl CreateEventRequest {
    pub fn new(title: impl Into<String>, start: i64) -> Self {
        Self {
            title: title.into(),
            start,
            end: None,
            all_day: false,
            note: None,
        }
    }

    pub fn ending_at(mut self, end: i64) -> Self {
        self.end = Some(end);
        self
    }

    pub fn all_day(mut self) -> Self {
        self.all_day = true;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Event service facade over repository implementations.
pub struct EventService<R: EventRepository> {
    repo: R,
    hub: SnapshotHub<Event>,
    clock: Arc<dyn Clock>,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_parts(repo, SnapshotHub::new("events"), system_clock())
    }

    pub fn with_parts(repo: R, hub: SnapshotHub<Event>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, hub, clock }
    }

    pub fn hub(&self) -> &SnapshotHub<Event> {
        &self.hub
    }

    pub fn create_event(
        &self,
        session: &Session,
        request: CreateEventRequest,
    ) -> ServiceResult<Event> {
        let owner = session.require_owner()?;
        let event = Event {
            id: Uuid::new_v4(),
            title: request.title.trim().to_string(),
            start_date: Some(request.start),
            end_date: request.end,
            is_all_day: request.all_day,
            created_at: self.clock.now_ms(),
            note: normalize_note(request.note),
        };

        self.repo.create_event(owner, &event)?;
        info!("event=event_create module=service status=ok event_id={}", event.id);
        self.publish(owner);
        Ok(event)
    }

    pub fn update_event(
        &self,
        session: &Session,
        id: RecordId,
        mut patch: EventPatch,
    ) -> ServiceResult<Event> {
        let owner = session.require_owner()?;
        let mut event = self
            .repo
            .get_event(owner, id)?
            .ok_or(ServiceError::NotFound(id))?;
        if patch.is_empty() {
            return Ok(event);
        }

        patch.title = patch.title.map(|title| title.trim().to_string());
        event.apply(patch);
        self.repo.update_event(owner, &event)?;
        info!("event=event_update module=service status=ok event_id={id}");
        self.publish(owner);
        Ok(event)
    }

    pub fn delete_event(&self, session: &Session, id: RecordId) -> ServiceResult<()> {
        let owner = session.require_owner()?;
        self.repo.delete_event(owner, id)?;
        info!("event=event_delete module=service status=ok event_id={id}");
        self.publish(owner);
        Ok(())
    }

    pub fn get_event(&self, session: &Session, id: RecordId) -> ServiceResult<Event> {
        let owner = session.require_owner()?;
        self.repo
            .get_event(owner, id)?
            .ok_or(ServiceError::NotFound(id))
    }

    pub fn list_events(&self, session: &Session) -> ServiceResult<Vec<Event>> {
        let owner = session.require_owner()?;
        Ok(self.repo.list_events(owner)?)
    }

    fn publish(&self, owner: &OwnerId) {
        match self.repo.list_events(owner) {
            Ok(snapshot) => {
                self.hub.publish(owner, &snapshot);
            }
            Err(err) => warn!(
                "event=snapshot_publish module=service status=error channel=events error={err}"
            ),
        }
    }
}

impl<R: EventRepository> RecordSource<Event> for EventService<R> {
    fn subscribe(&self, session: &Session) -> SourceResult<Subscription<Event>> {
        let owner = session.require_owner()?;
        let snapshot = self.repo.list_events(owner)?;
        Ok(self.hub.subscribe(owner, snapshot))
    }
}
