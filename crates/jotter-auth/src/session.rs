//! Session management.
//!
//! Bridges a resolved [`User`] to an opaque per-browser token and back.
//! Only the user's id is persisted server-side; the full profile is
//! reloaded from the identity store on every request so it can never go
//! stale.

use std::sync::Arc;

use cookie::{Cookie, SameSite};
use time::OffsetDateTime;

use crate::config::SessionConfig;
use crate::error::{AuthError, AuthResult};
use crate::storage::{IdentityStore, SessionStore, User};

/// Number of random bytes in a session token (hex-encoded on the wire).
const TOKEN_BYTES: usize = 32;

/// A freshly established session.
#[derive(Debug, Clone)]
pub struct EstablishedSession {
    /// The opaque token handed to the caller. Losing it is equivalent to
    /// losing the session.
    pub token: String,
    /// When the session expires if never used again.
    pub expires_at: OffsetDateTime,
}

/// Issues, resolves and destroys sessions against a pluggable backing store.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<dyn SessionStore>,
    identity: Arc<dyn IdentityStore>,
    config: SessionConfig,
}

impl SessionManager {
    /// Creates a new session manager.
    #[must_use]
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        identity: Arc<dyn IdentityStore>,
        config: SessionConfig,
    ) -> Self {
        Self {
            sessions,
            identity,
            config,
        }
    }

    /// Returns the session cookie name.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Establishes a session for an authenticated user.
    ///
    /// Generates an unguessable token and binds it to the user's id (the
    /// minimal durable reference) with the configured idle expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be stored.
    pub async fn establish(&self, user: &User) -> AuthResult<EstablishedSession> {
        let token = generate_session_token();
        let expires_at = OffsetDateTime::now_utc() + self.idle_timeout();

        self.sessions.create(&token, user.id, expires_at).await?;

        tracing::debug!(user_id = %user.id, "Session established");
        Ok(EstablishedSession { token, expires_at })
    }

    /// Resolves a session token back to the current user record.
    ///
    /// Refreshes the idle expiry as a side effect. An unknown or expired
    /// token yields `Unauthorized`; a token whose user no longer exists
    /// yields `NotFound`: callers treat both as "unauthenticated".
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or a store operation fails.
    pub async fn resolve(&self, token: &str) -> AuthResult<User> {
        let new_expires_at = OffsetDateTime::now_utc() + self.idle_timeout();

        let user_id = self
            .sessions
            .resolve(token, new_expires_at)
            .await?
            .ok_or_else(|| AuthError::unauthorized("Session expired or unknown"))?;

        self.identity
            .find_user(user_id)
            .await?
            .ok_or_else(|| AuthError::not_found("Session user no longer exists"))
    }

    /// Destroys a session. Idempotent: succeeds even if the token was
    /// already invalid.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store operation itself fails.
    pub async fn destroy(&self, token: &str) -> AuthResult<()> {
        self.sessions.delete(token).await?;
        tracing::debug!("Session destroyed");
        Ok(())
    }

    /// Deletes expired sessions and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup fails.
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        self.sessions.cleanup_expired().await
    }

    /// Builds the session cookie for an established session.
    #[must_use]
    pub fn cookie(&self, session: &EstablishedSession) -> Cookie<'static> {
        let max_age = time::Duration::seconds(self.config.idle_timeout.as_secs() as i64);

        Cookie::build((self.config.cookie_name.clone(), session.token.clone()))
            .http_only(true)
            .secure(self.config.secure_cookies)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(max_age)
            .build()
    }

    /// Builds an expired cookie that clears the session cookie.
    #[must_use]
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), String::new()))
            .http_only(true)
            .secure(self.config.secure_cookies)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::ZERO)
            .build()
    }

    fn idle_timeout(&self) -> time::Duration {
        time::Duration::seconds(self.config.idle_timeout.as_secs() as i64)
    }
}

/// Generates a cryptographically unguessable session token.
#[must_use]
pub fn generate_session_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
