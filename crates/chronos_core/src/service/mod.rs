//! Use-case services: the mutation boundary and live sources.
//!
//! # Responsibility
//! - Orchestrate repository calls into session-scoped use cases.
//! - Publish a fresh full snapshot after every successful mutation.
//! - Keep callers decoupled from storage details.

pub mod account_service;
pub mod clock;
pub mod event_service;
pub mod task_service;

use crate::model::record::{ModelValidationError, OwnerId, RecordId};
use crate::model::session::Unauthenticated;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for task, event and account use cases.
#[derive(Debug)]
pub enum ServiceError {
    /// The session has no signed-in owner.
    Unauthenticated,
    /// Input violates a record invariant.
    Validation(ModelValidationError),
    /// Local date/time does not exist in the requested time zone.
    InvalidSchedule(String),
    /// Target record does not exist for this owner.
    NotFound(RecordId),
    /// Owner has no stored profile.
    ProfileNotFound(OwnerId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "{}", Unauthenticated),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidSchedule(value) => {
                write!(f, "scheduled time does not exist in this time zone: {value}")
            }
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::ProfileNotFound(owner) => write!(f, "user profile not found: {owner}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Unauthenticated> for ServiceError {
    fn from(_: Unauthenticated) -> Self {
        Self::Unauthenticated
    }
}

impl From<ModelValidationError> for ServiceError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}
