//! Axum handlers for the `/auth/*` surface.
//!
//! # Usage
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use jotter_auth::http::{self, AuthHttpState};
//!
//! let app = Router::new()
//!     .route("/auth/{provider}", get(http::login_handler))
//!     .route("/auth/{provider}/callback", get(http::callback_handler))
//!     .route("/auth/logout", get(http::logout_handler))
//!     .route("/auth/user", get(http::current_user_handler))
//!     .with_state(auth_state);
//! ```
//!
//! The handlers take [`AuthHttpState`]; embed it in a larger application
//! state via `FromRef`.

mod callback;
mod login;
mod logout;
mod user;

use std::sync::Arc;

use axum::{
    Json,
    extract::FromRef,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub use callback::{CallbackParams, callback_handler};
pub use login::login_handler;
pub use logout::{LogoutResponse, logout_handler};
pub use user::current_user_handler;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::federation::Authenticator;
use crate::session::SessionManager;
use crate::storage::IdentityStore;

// =============================================================================
// State
// =============================================================================

/// State required by the `/auth/*` handlers.
#[derive(Clone)]
pub struct AuthHttpState {
    /// The federated authenticator.
    pub authenticator: Arc<Authenticator>,

    /// Identity store for provisioning and lookups.
    pub identity: Arc<dyn IdentityStore>,

    /// Session manager for establishing and destroying sessions.
    pub sessions: SessionManager,

    /// Auth configuration (redirect targets, cookie settings).
    pub config: Arc<AuthConfig>,
}

impl AuthHttpState {
    /// Creates the handler state.
    pub fn new(
        authenticator: Arc<Authenticator>,
        identity: Arc<dyn IdentityStore>,
        sessions: SessionManager,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            authenticator,
            identity,
            sessions,
            config,
        }
    }
}

impl FromRef<AuthHttpState> for SessionManager {
    fn from_ref(state: &AuthHttpState) -> Self {
        state.sessions.clone()
    }
}

// =============================================================================
// Error Responses
// =============================================================================

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = error_details(&self);

        // Server-side failures keep their detail in the logs, never in the
        // response body.
        let message = if self.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Maps an auth error to its HTTP status and stable error code.
fn error_details(error: &AuthError) -> (StatusCode, &'static str) {
    match error {
        AuthError::MalformedProfile { .. } => (StatusCode::BAD_REQUEST, "malformed_profile"),
        AuthError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
        AuthError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "unauthorized"),
        AuthError::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden"),
        AuthError::Provider { .. } => (StatusCode::BAD_GATEWAY, "identity_provider_error"),
        AuthError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        AuthError::Configuration { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
        }
    }
}
