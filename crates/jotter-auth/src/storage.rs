//! Identity and session storage traits.
//!
//! Defines the interface for user, federated-credential and session
//! persistence. Implementations are provided by storage backends (e.g.,
//! PostgreSQL in `jotter-postgres`); tests use in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AuthResult;

// =============================================================================
// Types
// =============================================================================

/// A user of the service.
///
/// Created exactly once per distinct human, on first successful federated
/// login. Never deleted by the identity core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier, generated on creation.
    pub id: Uuid,

    /// Display name.
    pub name: String,

    /// Email address.
    pub email: String,

    /// Profile picture URL, if the provider supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,

    /// When the user was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Profile picture URL.
    pub profile_picture: Option<String>,
}

/// A link between an external provider account and a local user.
///
/// The `(provider, subject)` pair is unique and maps to exactly one user.
/// Created at first login via that provider; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedCredential {
    /// Identity provider id (e.g., "google").
    pub provider: String,

    /// Subject identifier issued by the provider.
    pub subject: String,

    /// The linked local user.
    pub user_id: Uuid,
}

// =============================================================================
// Identity Store
// =============================================================================

/// Storage trait for users and federated credentials.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Finds a user by id.
    ///
    /// Returns `None` if no user with that id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn find_user(&self, id: Uuid) -> AuthResult<Option<User>>;

    /// Finds a federated credential by provider and subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn find_credential(
        &self,
        provider: &str,
        subject: &str,
    ) -> AuthResult<Option<FederatedCredential>>;

    /// Creates a user and its federated credential as one logical unit.
    ///
    /// Backends with transactions must execute both inserts atomically so
    /// a crash between them cannot leave a user with no resolvable
    /// credential; a backend without that support must document the
    /// residual risk.
    ///
    /// # Errors
    ///
    /// Returns a `Conflict`-derived error if the `(provider, subject)`
    /// pair is already linked, or an error if either insert fails.
    async fn create_user_with_credential(
        &self,
        user: NewUser,
        provider: &str,
        subject: &str,
    ) -> AuthResult<User>;
}

// =============================================================================
// Session Store
// =============================================================================

/// Storage trait for login sessions.
///
/// Sessions are keyed by unguessable token, so concurrent requests bearing
/// the same token race only on the expiry refresh; no coordination beyond
/// the store's own atomicity is required.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates a session binding `token` to `user_id` until `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    async fn create(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: OffsetDateTime,
    ) -> AuthResult<()>;

    /// Resolves a token to its user id, extending the idle expiry.
    ///
    /// The lookup and the refresh must be one atomic operation; the SQL
    /// shape is a conditional update:
    ///
    /// ```sql
    /// UPDATE sessions
    /// SET expires_at = $2
    /// WHERE token = $1 AND expires_at > now()
    /// RETURNING user_id
    /// ```
    ///
    /// Returns `None` for unknown or expired tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    async fn resolve(&self, token: &str, new_expires_at: OffsetDateTime)
    -> AuthResult<Option<Uuid>>;

    /// Deletes a session. Succeeds even if the token was already invalid.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store operation itself fails.
    async fn delete(&self, token: &str) -> AuthResult<()>;

    /// Deletes expired sessions and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
