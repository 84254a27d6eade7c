//! Task use-case service.
//!
//! # Responsibility
//! - Create, update, complete and delete tasks for the signed-in owner.
//! - Serve the owner's task collection as a live source.
//!
//! # Invariants
//! - New tasks start incomplete with `created_at` taken from the clock.
//! - Titles are trimmed; blank notes are stored as `None`.
//! - Every successful mutation publishes the owner's full task list.

use crate::model::record::{normalize_note, OwnerId, RecordId};
use crate::model::session::Session;
use crate::model::task::{Task, TaskPatch};
use crate::model::time::local_to_epoch_ms;
use crate::repo::task_repo::TaskRepository;
use crate::service::clock::{system_clock, Clock};
use crate::service::{ServiceError, ServiceResult};
use crate::source::{RecordSource, SnapshotHub, SourceResult, Subscription};
use chrono::{NaiveDate, NaiveTime, TimeZone};
use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Input for `TaskService::create_task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub title: String,
    /// Scheduled instant in epoch milliseconds.
    pub scheduled_at: i64,
    pub note: Option<String>,
    pub attachment_url: Option<String>,
}

impl CreateTaskRequest {
    pub fn new(title: impl Into<String>, scheduled_at: i64) -> Self {
        Self {
            title: title.into(),
            scheduled_at,
            note: None,
            attachment_url: None,
        }
    }

    /// Builds a request from a picked date and optional time in `tz`.
    ///
    /// Without a time the task is scheduled at the start of the day.
    pub fn at_local<Tz: TimeZone>(
        tz: &Tz,
        title: impl Into<String>,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> ServiceResult<Self> {
        let scheduled_at = local_to_epoch_ms(tz, date, time).ok_or_else(|| {
            ServiceError::InvalidSchedule(format!(
                "{date} {}",
                time.map_or_else(|| "00:00".to_string(), |t| t.format("%H:%M").to_string())
            ))
        })?;
        Ok(Self::new(title, scheduled_at))
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_attachment(mut self, url: impl Into<String>) -> Self {
        self.attachment_url = Some(url.into());
        self
    }
}

/// Task service facade over repository implementations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    hub: SnapshotHub<Task>,
    clock: Arc<dyn Clock>,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service with its own snapshot hub and the system clock.
    pub fn new(repo: R) -> Self {
        Self::with_parts(repo, SnapshotHub::new("tasks"), system_clock())
    }

    /// Creates a service sharing `hub` with other service instances.
    pub fn with_parts(repo: R, hub: SnapshotHub<Task>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, hub, clock }
    }

    pub fn hub(&self) -> &SnapshotHub<Task> {
        &self.hub
    }

    pub fn create_task(
        &self,
        session: &Session,
        request: CreateTaskRequest,
    ) -> ServiceResult<Task> {
        let owner = session.require_owner()?;
        let task = Task {
            id: Uuid::new_v4(),
            title: request.title.trim().to_string(),
            date: Some(request.scheduled_at),
            created_at: self.clock.now_ms(),
            is_completed: false,
            note: normalize_note(request.note),
            attachment_url: request.attachment_url,
        };

        self.repo.create_task(owner, &task)?;
        info!("event=task_create module=service status=ok task_id={}", task.id);
        self.publish(owner);
        Ok(task)
    }

    /// Applies `patch` to an existing task and returns the stored result.
    pub fn update_task(
        &self,
        session: &Session,
        id: RecordId,
        mut patch: TaskPatch,
    ) -> ServiceResult<Task> {
        let owner = session.require_owner()?;
        let mut task = self
            .repo
            .get_task(owner, id)?
            .ok_or(ServiceError::NotFound(id))?;
        if patch.is_empty() {
            return Ok(task);
        }

        patch.title = patch.title.map(|title| title.trim().to_string());
        task.apply(patch);
        self.repo.update_task(owner, &task)?;
        info!("event=task_update module=service status=ok task_id={id}");
        self.publish(owner);
        Ok(task)
    }

    pub fn set_task_completed(
        &self,
        session: &Session,
        id: RecordId,
        is_completed: bool,
    ) -> ServiceResult<Task> {
        self.update_task(
            session,
            id,
            TaskPatch {
                is_completed: Some(is_completed),
                ..TaskPatch::default()
            },
        )
    }

    pub fn delete_task(&self, session: &Session, id: RecordId) -> ServiceResult<()> {
        let owner = session.require_owner()?;
        self.repo.delete_task(owner, id)?;
        info!("event=task_delete module=service status=ok task_id={id}");
        self.publish(owner);
        Ok(())
    }

    pub fn get_task(&self, session: &Session, id: RecordId) -> ServiceResult<Task> {
        let owner = session.require_owner()?;
        self.repo
            .get_task(owner, id)?
            .ok_or(ServiceError::NotFound(id))
    }

    pub fn list_tasks(&self, session: &Session) -> ServiceResult<Vec<Task>> {
        let owner = session.require_owner()?;
        Ok(self.repo.list_tasks(owner)?)
    }

    fn publish(&self, owner: &OwnerId) {
        // The write already committed; a failed re-read only delays delivery
        // until the next successful mutation.
        match self.repo.list_tasks(owner) {
            Ok(snapshot) => {
                self.hub.publish(owner, &snapshot);
            }
            Err(err) => warn!(
                "event=snapshot_publish module=service status=error channel=tasks error={err}"
            ),
        }
    }
}

impl<R: TaskRepository> RecordSource<Task> for TaskService<R> {
    fn subscribe(&self, session: &Session) -> SourceResult<Subscription<Task>> {
        let owner = session.require_owner()?;
        let snapshot = self.repo.list_tasks(owner)?;
        Ok(self.hub.subscribe(owner, snapshot))
    }
}
