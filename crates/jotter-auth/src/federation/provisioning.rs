//! User provisioning for federated authentication.
//!
//! Maps a verified provider profile to a local user record:
//!
//! 1. **Find by credential**: check whether `(provider, subject)` is
//!    already linked
//! 2. **Create**: first login: insert the user and the credential as one
//!    logical unit
//! 3. **Load**: repeat login: load the linked user; a credential whose
//!    user is gone is a hard `NotFound`, never a fabricated user

use super::profile::ExternalProfile;
use crate::error::{AuthError, AuthResult};
use crate::storage::{IdentityStore, NewUser, User};

/// The action taken while resolving a profile to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningAction {
    /// An existing linked user was found.
    ExistingIdentity,

    /// A new user and credential were created.
    Created,
}

impl ProvisioningAction {
    /// Returns `true` if a new user was created.
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }
}

impl std::fmt::Display for ProvisioningAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExistingIdentity => write!(f, "existing_identity"),
            Self::Created => write!(f, "created"),
        }
    }
}

/// Resolves a verified provider profile to a local user.
///
/// The profile must have passed [`ExternalProfile::validate`]; this
/// function re-checks it to keep the invariant local.
///
/// # Errors
///
/// - `MalformedProfile` if the profile lacks a subject id or email
/// - `NotFound` if the credential points at a user that no longer exists
/// - storage errors are propagated; when creation fails, no session must be
///   established by the caller
pub async fn resolve_user(
    store: &dyn IdentityStore,
    provider_id: &str,
    profile: &ExternalProfile,
) -> AuthResult<(User, ProvisioningAction)> {
    profile.validate()?;

    match store.find_credential(provider_id, &profile.sub).await? {
        None => {
            let new_user = NewUser {
                name: profile.display_name(),
                email: profile.email().to_string(),
                profile_picture: profile.picture.clone(),
            };
            let user = store
                .create_user_with_credential(new_user, provider_id, &profile.sub)
                .await?;

            tracing::info!(
                provider = %provider_id,
                user_id = %user.id,
                "Provisioned new user from federated login"
            );
            Ok((user, ProvisioningAction::Created))
        }
        Some(credential) => {
            let user = store.find_user(credential.user_id).await?.ok_or_else(|| {
                AuthError::not_found(format!(
                    "credential for {provider_id} resolves to missing user {}",
                    credential.user_id
                ))
            })?;
            Ok((user, ProvisioningAction::ExistingIdentity))
        }
    }
}
