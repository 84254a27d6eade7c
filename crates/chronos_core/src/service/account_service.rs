//! Account profile use cases.
//!
//! Authentication itself is delegated to an external provider; this service
//! only stores and reads the profile document keyed by the signed-in owner.

use crate::model::profile::UserProfile;
use crate::model::session::Session;
use crate::repo::profile_repo::ProfileRepository;
use crate::service::clock::{system_clock, Clock};
use crate::service::{ServiceError, ServiceResult};
use log::info;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterProfileRequest {
    pub name: String,
    pub last_name: String,
    pub email: String,
}

pub struct AccountService<R: ProfileRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
}

impl<R: ProfileRepository> AccountService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, system_clock())
    }

    pub fn with_clock(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Stores the profile for the signed-in owner.
    ///
    /// Re-registering replaces name and e-mail but keeps the original
    /// creation instant.
    pub fn register_profile(
        &self,
        session: &Session,
        request: RegisterProfileRequest,
    ) -> ServiceResult<UserProfile> {
        let owner = session.require_owner()?;
        let profile = UserProfile {
            id: owner.clone(),
            name: request.name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email: request.email.trim().to_string(),
            created_at: self.clock.now_ms(),
        };

        self.repo.upsert_profile(&profile)?;
        info!("event=profile_register module=service status=ok");
        self.get_profile(session)
    }

    /// Reads the signed-in owner's profile.
    pub fn get_profile(&self, session: &Session) -> ServiceResult<UserProfile> {
        let owner = session.require_owner()?;
        self.repo
            .get_profile(owner)?
            .ok_or_else(|| ServiceError::ProfileNotFound(owner.clone()))
    }
}
