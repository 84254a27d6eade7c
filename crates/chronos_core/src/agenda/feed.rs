//! Live agenda: combines task and event channels and regroups on change.
//!
//! # Invariants
//! - Grouping runs only once both channels delivered at least one snapshot.
//! - Each snapshot replaces the previous one for its channel wholesale.
//! - No incremental state is kept between groupings.

use crate::agenda::group::{group_by_day, GroupedAgenda};
use crate::model::event::Event;
use crate::model::session::Session;
use crate::model::task::Task;
use crate::source::{RecordSource, SourceResult, Subscription};
use chrono::{DateTime, TimeZone};
use log::debug;

/// Readiness of the combined view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Loading { tasks_ready: bool, events_ready: bool },
    Ready,
    /// A source behind the feed was dropped; the last grouping is final.
    Closed { tasks_closed: bool, events_closed: bool },
}

/// Latest snapshot per channel.
#[derive(Debug, Clone, Default)]
pub struct AgendaState {
    tasks: Option<Vec<Task>>,
    events: Option<Vec<Event>>,
}

impl AgendaState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the task snapshot. Tasks are ordered by scheduled date,
    /// undated last; ties keep snapshot order.
    pub fn apply_tasks(&mut self, mut snapshot: Vec<Task>) {
        snapshot.sort_by_key(|task| (task.date.is_none(), task.date));
        self.tasks = Some(snapshot);
    }

    /// Replaces the event snapshot, ordered by start date.
    pub fn apply_events(&mut self, mut snapshot: Vec<Event>) {
        snapshot.sort_by_key(|event| (event.start_date.is_none(), event.start_date));
        self.events = Some(snapshot);
    }

    pub fn status(&self) -> FeedStatus {
        match (&self.tasks, &self.events) {
            (Some(_), Some(_)) => FeedStatus::Ready,
            (tasks, events) => FeedStatus::Loading {
                tasks_ready: tasks.is_some(),
                events_ready: events.is_some(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status() == FeedStatus::Ready
    }

    pub fn tasks(&self) -> Option<&[Task]> {
        self.tasks.as_deref()
    }

    pub fn events(&self) -> Option<&[Event]> {
        self.events.as_deref()
    }

    /// Groups the current snapshots, or `None` while still loading.
    pub fn group<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<GroupedAgenda> {
        let tasks = self.tasks.as_deref()?;
        let events = self.events.as_deref()?;
        let grouped = group_by_day(tasks, events, now);
        if grouped.skipped() > 0 {
            debug!(
                "event=agenda_group module=agenda status=partial skipped={} grouped={}",
                grouped.skipped(),
                grouped.len()
            );
        }
        Some(grouped)
    }
}

/// Owns one task and one event subscription for the same session.
pub struct AgendaFeed {
    tasks: Subscription<Task>,
    events: Subscription<Event>,
    state: AgendaState,
}

impl AgendaFeed {
    /// Subscribes to both sources for the signed-in owner.
    pub fn subscribe<TS, ES>(
        task_source: &TS,
        event_source: &ES,
        session: &Session,
    ) -> SourceResult<Self>
    where
        TS: RecordSource<Task>,
        ES: RecordSource<Event>,
    {
        let tasks = task_source.subscribe(session)?;
        let events = event_source.subscribe(session)?;
        Ok(Self::from_subscriptions(tasks, events))
    }

    pub fn from_subscriptions(tasks: Subscription<Task>, events: Subscription<Event>) -> Self {
        Self {
            tasks,
            events,
            state: AgendaState::new(),
        }
    }

    /// Drains both channels without blocking.
    ///
    /// Returns a fresh grouping when anything changed and both channels are
    /// ready; `None` otherwise. A `None` with [`FeedStatus::Closed`] means a
    /// source is gone rather than quiet.
    pub fn poll<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Option<GroupedAgenda> {
        let mut changed = false;
        if let Some(snapshot) = self.tasks.try_latest() {
            self.state.apply_tasks(snapshot);
            changed = true;
        }
        if let Some(snapshot) = self.events.try_latest() {
            self.state.apply_events(snapshot);
            changed = true;
        }

        if !changed {
            return None;
        }
        self.state.group(now)
    }

    /// Regroups the latest snapshots against `now` without draining.
    pub fn current<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<GroupedAgenda> {
        self.state.group(now)
    }

    pub fn status(&self) -> FeedStatus {
        let tasks_closed = self.tasks.is_closed();
        let events_closed = self.events.is_closed();
        if tasks_closed || events_closed {
            return FeedStatus::Closed {
                tasks_closed,
                events_closed,
            };
        }
        self.state.status()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.status(), FeedStatus::Closed { .. })
    }

    pub fn state(&self) -> &AgendaState {
        &self.state
    }

    /// Drops both subscriptions.
    pub fn unsubscribe(self) {}
}
