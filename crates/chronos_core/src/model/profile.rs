//! User profile record written at registration.

use crate::model::record::{ModelValidationError, OwnerId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Profile document for one user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: OwnerId,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: i64,
}

impl UserProfile {
    /// Checks the e-mail shape `local@domain.tld`; other fields are free text.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(ModelValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }

    /// Display name used by the profile screen.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}
