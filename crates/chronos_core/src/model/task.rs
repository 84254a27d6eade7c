//! Task domain model.
//!
//! # Responsibility
//! - Define the task record as stored per owner and delivered in snapshots.
//! - Provide patch semantics for partial updates.
//!
//! # Invariants
//! - `id` is stable and never reused.
//! - `title` is non-empty after trimming.
//! - `attachment_url`, when set, is an absolute http(s) URL.
//! - `date` may be absent on foreign records; such tasks are never bucketed.

use crate::model::record::{
    normalize_note, validate_attachment_url, validate_id, validate_title, ModelValidationError,
    RecordId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduled to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    /// Scheduled instant in epoch milliseconds.
    pub date: Option<i64>,
    /// Creation instant in epoch milliseconds.
    pub created_at: i64,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

impl Task {
    /// Creates an incomplete task with a generated id.
    pub fn new(title: impl Into<String>, date: i64, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            date: Some(date),
            created_at,
            is_completed: false,
            note: None,
            attachment_url: None,
        }
    }

    /// Checks record invariants before persistence and after reads.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_id(self.id)?;
        validate_title(&self.title)?;
        validate_attachment_url(self.attachment_url.as_deref())?;
        Ok(())
    }

    /// Applies a partial update in place.
    ///
    /// Fields left as `None` in the patch are untouched. Doubly optional
    /// fields clear the value with `Some(None)`.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(date) = patch.date {
            self.date = Some(date);
        }
        if let Some(is_completed) = patch.is_completed {
            self.is_completed = is_completed;
        }
        if let Some(note) = patch.note {
            self.note = normalize_note(note);
        }
        if let Some(attachment_url) = patch.attachment_url {
            self.attachment_url = attachment_url;
        }
    }
}

/// Partial update for a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub date: Option<i64>,
    pub is_completed: Option<bool>,
    pub note: Option<Option<String>>,
    pub attachment_url: Option<Option<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
