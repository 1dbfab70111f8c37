//! Login callback handler.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::AuthHttpState;
use crate::error::{AuthError, AuthResult};
use crate::federation::ticket::LoginTicket;
use crate::federation::provisioning::resolve_user;

/// Query parameters the provider sends to the callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// Authorization code (present on success).
    #[serde(default)]
    pub code: Option<String>,

    /// Echoed OAuth state parameter.
    #[serde(default)]
    pub state: Option<String>,

    /// OAuth error code (present when the provider rejected the request).
    #[serde(default)]
    pub error: Option<String>,

    /// Optional human-readable error description.
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Handler for `GET /auth/{provider}/callback`.
///
/// Completes the login: verifies the state against the signed ticket
/// cookie, exchanges the code, resolves the profile to a local user, and
/// establishes a session. On success the browser is redirected to the
/// configured front-end URL with the session cookie set; every failure is
/// logged and redirected to the failure URL: no raw error ever reaches
/// the browser from this endpoint.
pub async fn callback_handler(
    State(state): State<AuthHttpState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Result<Response, AuthError> {
    if provider != state.authenticator.provider_id() {
        return Err(AuthError::not_found(format!(
            "unknown identity provider: {provider}"
        )));
    }

    // The ticket cookie is single-use: cleared on every outcome.
    let outcome = complete(&state, &params, &jar).await;
    let jar = jar.remove(LoginTicket::removal_cookie(state.sessions.config()));

    match outcome {
        Ok(session_cookie) => {
            let jar = jar.add(session_cookie);
            Ok((jar, Redirect::to(&state.config.redirect.success_url)).into_response())
        }
        Err(e) => {
            tracing::warn!(provider = %provider, error = %e, "Login failed");
            Ok((jar, Redirect::to(&state.config.redirect.failure_url)).into_response())
        }
    }
}

/// Runs the fallible part of the callback and returns the session cookie.
async fn complete(
    state: &AuthHttpState,
    params: &CallbackParams,
    jar: &CookieJar,
) -> AuthResult<cookie::Cookie<'static>> {
    if let Some(error) = &params.error {
        return Err(AuthError::provider(
            state.authenticator.provider_id(),
            format!(
                "{error}{}",
                params
                    .error_description
                    .as_ref()
                    .map(|d| format!(" ({d})"))
                    .unwrap_or_default()
            ),
        ));
    }

    let session_config = state.sessions.config();
    let ticket = jar
        .get(&session_config.state_cookie_name())
        .map(|c| LoginTicket::unseal(c.value(), &session_config.secret))
        .transpose()?
        .ok_or_else(|| AuthError::unauthorized("Missing login ticket cookie"))?;

    let echoed_state = params
        .state
        .as_deref()
        .ok_or_else(|| AuthError::unauthorized("Missing state parameter"))?;
    if echoed_state != ticket.state {
        return Err(AuthError::unauthorized("State parameter mismatch"));
    }

    let code = params
        .code
        .as_deref()
        .ok_or_else(|| AuthError::unauthorized("Missing authorization code"))?;

    let profile = state
        .authenticator
        .complete_login(code, &ticket.verifier)
        .await?;

    let (user, action) = resolve_user(
        state.identity.as_ref(),
        state.authenticator.provider_id(),
        &profile,
    )
    .await?;

    tracing::info!(user_id = %user.id, action = %action, "Login completed");

    let session = state.sessions.establish(&user).await?;
    Ok(state.sessions.cookie(&session))
}
