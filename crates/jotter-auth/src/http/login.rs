//! Login start handler.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use super::AuthHttpState;
use crate::error::AuthError;

/// Handler for `GET /auth/{provider}`.
///
/// Redirects the browser to the provider's authorization endpoint. The
/// pending-login ticket (state + PKCE verifier) is set as a signed,
/// short-lived cookie; no server-side state is created.
///
/// Unknown provider ids are 404. Provider/discovery failures redirect to
/// the configured failure URL instead of surfacing an error page.
pub async fn login_handler(
    State(state): State<AuthHttpState>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> Result<Response, AuthError> {
    if provider != state.authenticator.provider_id() {
        return Err(AuthError::not_found(format!(
            "unknown identity provider: {provider}"
        )));
    }

    match state.authenticator.begin_login().await {
        Ok(login) => {
            let jar = jar.add(login.ticket.cookie(state.sessions.config()));
            Ok((jar, Redirect::to(login.authorization_url.as_str())).into_response())
        }
        Err(e) => {
            tracing::warn!(provider = %provider, error = %e, "Login start failed");
            Ok(Redirect::to(&state.config.redirect.failure_url).into_response())
        }
    }
}
