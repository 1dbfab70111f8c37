//! Request-time authorization guard.
//!
//! [`CurrentUser`] is an Axum extractor composed into every state-changing
//! or identity-dependent handler: it resolves the session cookie to a full
//! user record or rejects with 401. [`require_ownership`] is the pure
//! resource-scoped check evaluated after the target resource is loaded and
//! before any mutation is issued.
//!
//! # Example
//!
//! ```ignore
//! use jotter_auth::{CurrentUser, require_ownership};
//!
//! async fn delete_post(CurrentUser(user): CurrentUser, /* ... */) -> Result<(), AuthError> {
//!     let post = load_post(id).await?.ok_or_else(not_found)?;
//!     require_ownership(user.id, post.user_id)?;
//!     // mutation is now allowed
//!     Ok(())
//! }
//! ```

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::COOKIE, request::Parts},
};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::session::SessionManager;
use crate::storage::User;

// =============================================================================
// Current User Extractor
// =============================================================================

/// Axum extractor that resolves the session cookie to the current user.
///
/// Rejects with `Unauthorized` (401) when the cookie is absent, the token
/// is unknown or expired, or the session's user no longer exists: the
/// last case is deliberately indistinguishable from having no session.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionManager: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionManager::from_ref(state);

        let token = extract_cookie(parts, sessions.cookie_name())
            .ok_or_else(|| AuthError::unauthorized("Missing session cookie"))?;

        let user = sessions.resolve(&token).await.map_err(|e| {
            if e.is_unauthenticated() {
                tracing::debug!(error = %e, "Session resolution rejected");
                AuthError::unauthorized("Invalid or expired session")
            } else {
                e
            }
        })?;

        Ok(Self(user))
    }
}

/// Checks that the authenticated identity owns the target resource.
///
/// Pure comparison; the owner id must come from the loaded resource row,
/// never from caller-supplied request data. Call only after the resource
/// is confirmed to exist: existence failures are 404, not 403.
///
/// # Errors
///
/// Returns `Forbidden` when the ids differ.
pub fn require_ownership(identity_id: Uuid, owner_id: Uuid) -> AuthResult<()> {
    if identity_id == owner_id {
        Ok(())
    } else {
        Err(AuthError::forbidden("Not the owner of this resource"))
    }
}

/// Extracts a cookie value by name from the request headers.
///
/// Parses the Cookie header's simple `key=value; key=value` format.
pub(crate) fn extract_cookie(parts: &Parts, name: &str) -> Option<String> {
    let cookie_header = parts.headers.get(COOKIE)?.to_str().ok()?;

    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if let Some((key, value)) = cookie.split_once('=')
            && key.trim() == name
        {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with_cookie(header: &str) -> Parts {
        let request = Request::builder()
            .uri("/posts")
            .header(COOKIE, header)
            .body(())
            .unwrap();
        request.into_parts().0
    }

    #[test]
    fn test_require_ownership_allows_owner() {
        let id = Uuid::new_v4();
        assert!(require_ownership(id, id).is_ok());
    }

    #[test]
    fn test_require_ownership_rejects_non_owner() {
        let err = require_ownership(Uuid::new_v4(), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden { .. }));
        assert!(!err.is_unauthenticated());
    }

    #[test]
    fn test_extract_cookie() {
        let parts = parts_with_cookie("other=1; jotter_session=abc123; theme=dark");
        assert_eq!(
            extract_cookie(&parts, "jotter_session"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_extract_cookie_missing_or_empty() {
        let parts = parts_with_cookie("jotter_session=; other=1");
        assert_eq!(extract_cookie(&parts, "jotter_session"), None);
        assert_eq!(extract_cookie(&parts, "absent"), None);
    }

    #[test]
    fn test_extract_cookie_whitespace() {
        let parts = parts_with_cookie(" jotter_session = abc ");
        assert_eq!(
            extract_cookie(&parts, "jotter_session"),
            Some("abc".to_string())
        );
    }
}
