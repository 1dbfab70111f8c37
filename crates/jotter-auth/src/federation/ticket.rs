//! Login ticket: the state carried across the redirect round-trip.
//!
//! `begin_login` creates no server-side state; the OAuth `state` parameter
//! and the PKCE verifier travel in a signed, short-lived browser cookie
//! scoped to the `/auth` path. The signature stops the browser (or anything
//! between) from swapping in its own state, and the state comparison on the
//! callback is the CSRF check.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::pkce::PkceVerifier;
use crate::config::SessionConfig;
use crate::error::{AuthError, AuthResult};

/// How long the browser has to complete the provider round-trip.
const TICKET_MAX_AGE: time::Duration = time::Duration::minutes(10);

/// Pending-login state: the OAuth state parameter plus the PKCE verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginTicket {
    /// Random OAuth state parameter.
    pub state: String,

    /// PKCE verifier for the eventual code exchange.
    pub verifier: PkceVerifier,
}

impl LoginTicket {
    /// Creates a ticket with a fresh random state and PKCE verifier.
    #[must_use]
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self {
            state: hex::encode(bytes),
            verifier: PkceVerifier::generate(),
        }
    }

    /// Serializes and signs the ticket into a cookie value.
    ///
    /// Format: `base64url(json) "." base64url(sha256(secret || "." || payload))`.
    #[must_use]
    pub fn seal(&self, secret: &str) -> String {
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(self).expect("LoginTicket always serializes"),
        );
        let tag = sign(secret, &payload);
        format!("{payload}.{tag}")
    }

    /// Verifies the signature and deserializes a sealed ticket.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for a missing, malformed or tampered value.
    pub fn unseal(sealed: &str, secret: &str) -> AuthResult<Self> {
        let (payload, tag) = sealed
            .split_once('.')
            .ok_or_else(|| AuthError::unauthorized("Malformed login ticket"))?;

        if sign(secret, payload) != tag {
            return Err(AuthError::unauthorized("Login ticket signature mismatch"));
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::unauthorized("Malformed login ticket"))?;
        serde_json::from_slice(&bytes)
            .map_err(|_| AuthError::unauthorized("Malformed login ticket"))
    }

    /// Builds the short-lived ticket cookie.
    #[must_use]
    pub fn cookie(&self, config: &SessionConfig) -> Cookie<'static> {
        Cookie::build((config.state_cookie_name(), self.seal(&config.secret)))
            .http_only(true)
            .secure(config.secure_cookies)
            .same_site(SameSite::Lax)
            .path("/auth")
            .max_age(TICKET_MAX_AGE)
            .build()
    }

    /// Builds an expired cookie that clears the ticket cookie.
    #[must_use]
    pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
        Cookie::build((config.state_cookie_name(), String::new()))
            .http_only(true)
            .secure(config.secure_cookies)
            .same_site(SameSite::Lax)
            .path("/auth")
            .max_age(time::Duration::ZERO)
            .build()
    }
}

fn sign(secret: &str, payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b".");
    hasher.update(payload.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_seal_unseal_round_trip() {
        let ticket = LoginTicket::generate();
        let sealed = ticket.seal(SECRET);

        let unsealed = LoginTicket::unseal(&sealed, SECRET).unwrap();
        assert_eq!(unsealed.state, ticket.state);
        assert_eq!(unsealed.verifier, ticket.verifier);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let ticket = LoginTicket::generate();
        let sealed = ticket.seal(SECRET);

        let (payload, tag) = sealed.split_once('.').unwrap();
        let other = LoginTicket::generate().seal(SECRET);
        let (other_payload, _) = other.split_once('.').unwrap();

        // Someone else's payload with our tag.
        let forged = format!("{other_payload}.{tag}");
        assert!(LoginTicket::unseal(&forged, SECRET).is_err());

        // Our payload with a truncated tag.
        let forged = format!("{payload}.{}", &tag[..tag.len() - 2]);
        assert!(LoginTicket::unseal(&forged, SECRET).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let ticket = LoginTicket::generate();
        let sealed = ticket.seal(SECRET);
        assert!(LoginTicket::unseal(&sealed, "another-secret-entirely").is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(LoginTicket::unseal("no-dot-here", SECRET).is_err());
        assert!(LoginTicket::unseal("!!!.@@@", SECRET).is_err());
    }

    #[test]
    fn test_states_are_unique() {
        assert_ne!(LoginTicket::generate().state, LoginTicket::generate().state);
    }

    #[test]
    fn test_cookie_scope() {
        let config = SessionConfig {
            secret: SECRET.to_string(),
            ..SessionConfig::default()
        };
        let ticket = LoginTicket::generate();
        let cookie = ticket.cookie(&config);

        assert_eq!(cookie.name(), "jotter_session_login");
        assert_eq!(cookie.path(), Some("/auth"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(TICKET_MAX_AGE));
    }
}
