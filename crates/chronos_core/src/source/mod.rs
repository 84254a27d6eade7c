//! Live record source boundary.
//!
//! # Responsibility
//! - Deliver owner-scoped collections as full snapshots over channels.
//! - Pair every subscription with an unsubscribe handle.
//!
//! # Invariants
//! - A new subscription receives the current snapshot immediately.
//! - Every change publishes the whole collection, never a delta.
//! - After unsubscribe (or drop) no further snapshot is delivered.

mod hub;
mod subscription;

pub use hub::SnapshotHub;
pub use subscription::{Subscription, SubscriptionId};

use crate::model::session::{Session, Unauthenticated};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SourceResult<T> = Result<T, SourceError>;

/// Failure to establish a subscription.
#[derive(Debug)]
pub enum SourceError {
    Unauthenticated,
    Repo(RepoError),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "{}", Unauthenticated),
            Self::Repo(err) => write!(f, "failed to load initial snapshot: {err}"),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unauthenticated => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<Unauthenticated> for SourceError {
    fn from(_: Unauthenticated) -> Self {
        Self::Unauthenticated
    }
}

impl From<RepoError> for SourceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Live collection provider for one record type.
pub trait RecordSource<T> {
    /// Subscribes to the signed-in owner's collection.
    fn subscribe(&self, session: &Session) -> SourceResult<Subscription<T>>;
}
