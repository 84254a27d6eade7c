//! Explicit signed-in user context.
//!
//! Every store call receives a `Session` instead of reading an ambient
//! "current user". A signed-out session fails with `Unauthenticated`.

use crate::model::record::OwnerId;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unauthenticated;

impl Display for Unauthenticated {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "no user is signed in")
    }
}

impl Error for Unauthenticated {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    owner: Option<OwnerId>,
}

impl Session {
    pub fn signed_in(owner: OwnerId) -> Self {
        Self { owner: Some(owner) }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn sign_out(&mut self) {
        self.owner = None;
    }

    pub fn owner(&self) -> Option<&OwnerId> {
        self.owner.as_ref()
    }

    /// Returns the owner or `Unauthenticated` when signed out.
    pub fn require_owner(&self) -> Result<&OwnerId, Unauthenticated> {
        self.owner.as_ref().ok_or(Unauthenticated)
    }
}
