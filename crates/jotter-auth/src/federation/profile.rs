//! Provider profile types.

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// A user profile returned by the provider's userinfo endpoint.
///
/// Field names follow the standard OIDC claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalProfile {
    /// Provider-assigned subject identifier.
    #[serde(default)]
    pub sub: String,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Profile photo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl ExternalProfile {
    /// Validates that the profile carries enough data to identify a user.
    ///
    /// Runs before any storage access: a profile without a subject id or
    /// email can never be resolved or provisioned.
    ///
    /// # Errors
    ///
    /// Returns `MalformedProfile` when the subject id or email is missing.
    pub fn validate(&self) -> AuthResult<()> {
        if self.sub.is_empty() {
            return Err(AuthError::malformed_profile("missing subject id"));
        }
        match &self.email {
            Some(email) if !email.is_empty() => Ok(()),
            _ => Err(AuthError::malformed_profile("missing email")),
        }
    }

    /// Email address after [`validate`](Self::validate) has passed.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    /// Display name, falling back to the email local part when the
    /// provider omits a name.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name
            && !name.is_empty()
        {
            return name.clone();
        }
        self.email()
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}
