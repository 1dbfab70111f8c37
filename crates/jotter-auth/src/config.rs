//! Authentication configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! callback_url = "https://api.example.com/auth/google/callback"
//!
//! [auth.provider]
//! id = "google"
//! name = "Google"
//! issuer = "https://accounts.google.com"
//! client_id = "client-123"
//! client_secret = "secret-456"
//!
//! [auth.session]
//! secret = "long-random-string"
//! idle_timeout = "7d"
//!
//! [auth.redirect]
//! success_url = "https://app.example.com/"
//! failure_url = "https://app.example.com/login?error=1"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::federation::provider::IdentityProviderConfig;

/// Root authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// The single external identity provider.
    pub provider: IdentityProviderConfig,

    /// Absolute callback URL registered with the provider.
    pub callback_url: String,

    /// Session cookie and lifetime settings.
    pub session: SessionConfig,

    /// Where the browser lands after login.
    pub redirect: RedirectConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider: IdentityProviderConfig::default(),
            callback_url: "http://localhost:8080/auth/google/callback".to_string(),
            session: SessionConfig::default(),
            redirect: RedirectConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.provider.client_id.is_empty() {
            return Err("auth.provider.client_id must not be empty".into());
        }
        if self.callback_url.is_empty() {
            return Err("auth.callback_url must not be empty".into());
        }
        self.session.validate()?;
        if self.redirect.success_url.is_empty() {
            return Err("auth.redirect.success_url must not be empty".into());
        }
        if self.redirect.failure_url.is_empty() {
            return Err("auth.redirect.failure_url must not be empty".into());
        }
        Ok(())
    }
}

/// Session cookie and lifetime settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,

    /// Secret used to sign the short-lived login-state cookie.
    pub secret: String,

    /// Idle expiry: a session not resolved for this long becomes invalid.
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,

    /// Whether cookies carry the `Secure` attribute. Disable only for
    /// plain-HTTP local development; the server logs a warning when off.
    pub secure_cookies: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "jotter_session".to_string(),
            secret: String::new(),
            idle_timeout: Duration::from_secs(7 * 24 * 60 * 60),
            secure_cookies: true,
        }
    }
}

impl SessionConfig {
    /// Name of the login-state cookie derived from the session cookie name.
    #[must_use]
    pub fn state_cookie_name(&self) -> String {
        format!("{}_login", self.cookie_name)
    }

    /// Validates the session settings.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.cookie_name.is_empty() {
            return Err("auth.session.cookie_name must not be empty".into());
        }
        if self.secret.len() < 16 {
            return Err("auth.session.secret must be at least 16 characters".into());
        }
        if self.idle_timeout.is_zero() {
            return Err("auth.session.idle_timeout must be > 0".into());
        }
        Ok(())
    }
}

/// Post-login browser destinations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Front-end URL the browser is sent to after a successful login.
    pub success_url: String,

    /// Front-end URL the browser is sent to when the login fails.
    pub failure_url: String,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            success_url: "http://localhost:3000/".to_string(),
            failure_url: "http://localhost:3000/login?error=1".to_string(),
        }
    }
}
