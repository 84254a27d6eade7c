//! Calendar event domain model.
//!
//! # Invariants
//! - `end_date` is never earlier than `start_date` when both are set.
//! - `title` is non-empty after trimming.

use crate::model::record::{
    normalize_note, validate_id, validate_title, ModelValidationError, RecordId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A calendar entry with a start and optional end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: RecordId,
    pub title: String,
    /// Start instant in epoch milliseconds.
    pub start_date: Option<i64>,
    /// End instant in epoch milliseconds.
    pub end_date: Option<i64>,
    pub is_all_day: bool,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Event {
    /// Creates a timed event with a generated id.
    pub fn new(title: impl Into<String>, start_date: i64, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            start_date: Some(start_date),
            end_date: None,
            is_all_day: false,
            created_at,
            note: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_id(self.id)?;
        validate_title(&self.title)?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ModelValidationError::InvalidEventWindow { start, end });
            }
        }
        Ok(())
    }

    /// Applies a partial update in place.
    pub fn apply(&mut self, patch: EventPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = Some(start_date);
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(is_all_day) = patch.is_all_day {
            self.is_all_day = is_all_day;
        }
        if let Some(note) = patch.note {
            self.note = normalize_note(note);
        }
    }
}

/// Partial update for an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub start_date: Option<i64>,
    pub end_date: Option<Option<i64>>,
    pub is_all_day: Option<bool>,
    pub note: Option<Option<String>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
