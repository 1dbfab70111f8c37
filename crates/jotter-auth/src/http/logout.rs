//! Logout handler.

use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use super::AuthHttpState;
use crate::error::AuthError;
use crate::extractors::CurrentUser;

/// Response from the logout endpoint.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Whether the logout was successful.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

/// Handler for `GET /auth/logout`.
///
/// Requires an authenticated caller, invalidates the server-side session
/// and clears the cookie. Destroying an already-destroyed session does not
/// error; only the guard in front of this handler can reject the request.
pub async fn logout_handler(
    State(state): State<AuthHttpState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<LogoutResponse>), AuthError> {
    if let Some(cookie) = jar.get(state.sessions.cookie_name()) {
        state.sessions.destroy(cookie.value()).await?;
    }

    tracing::info!(user_id = %user.id, "User logged out");

    let jar = jar.remove(state.sessions.removal_cookie());
    Ok((
        jar,
        Json(LogoutResponse {
            success: true,
            message: "Logged out".to_string(),
        }),
    ))
}
