//! Shared identity and validation primitives.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static ATTACHMENT_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/]+\S*$").expect("valid attachment url regex"));

/// Stable identifier for tasks and events.
pub type RecordId = Uuid;

/// Validation failures for record and identity invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    NilId,
    EmptyTitle,
    EmptyOwnerId,
    InvalidOwnerId(String),
    InvalidAttachmentUrl(String),
    InvalidEventWindow { start: i64, end: i64 },
    InvalidEmail(String),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "record id must not be nil"),
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyOwnerId => write!(f, "owner id must not be empty"),
            Self::InvalidOwnerId(value) => write!(f, "owner id is invalid: `{value}`"),
            Self::InvalidAttachmentUrl(value) => {
                write!(f, "attachment must be an absolute http(s) url, got `{value}`")
            }
            Self::InvalidEventWindow { start, end } => {
                write!(f, "event end ({end}) is earlier than start ({start})")
            }
            Self::InvalidEmail(value) => write!(f, "email is invalid: `{value}`"),
        }
    }
}

impl Error for ModelValidationError {}

/// Identifier of the user account that owns a record collection.
///
/// Owner ids were document path segments in the hosted store, so they must be
/// non-empty and must not contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    pub fn parse(value: impl Into<String>) -> Result<Self, ModelValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelValidationError::EmptyOwnerId);
        }
        if trimmed.contains('/') || trimmed.chars().any(char::is_whitespace) {
            return Err(ModelValidationError::InvalidOwnerId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OwnerId {
    type Error = ModelValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<OwnerId> for String {
    fn from(value: OwnerId) -> Self {
        value.0
    }
}

pub(crate) fn validate_id(id: RecordId) -> Result<(), ModelValidationError> {
    if id.is_nil() {
        return Err(ModelValidationError::NilId);
    }
    Ok(())
}

pub(crate) fn validate_title(title: &str) -> Result<(), ModelValidationError> {
    if title.trim().is_empty() {
        return Err(ModelValidationError::EmptyTitle);
    }
    Ok(())
}

pub(crate) fn validate_attachment_url(url: Option<&str>) -> Result<(), ModelValidationError> {
    match url {
        Some(value) if !ATTACHMENT_URL_RE.is_match(value) => {
            Err(ModelValidationError::InvalidAttachmentUrl(value.to_string()))
        }
        _ => Ok(()),
    }
}

/// Normalizes optional free text: blank input becomes `None`.
pub(crate) fn normalize_note(note: Option<String>) -> Option<String> {
    note.filter(|value| !value.trim().is_empty())
}
