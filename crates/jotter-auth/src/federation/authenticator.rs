//! The federated authenticator.
//!
//! Drives the three-step redirect handshake with the external identity
//! provider: build the authorization URL, exchange the callback code for
//! tokens, and fetch the verified profile from the userinfo endpoint.
//!
//! An [`Authenticator`] is an explicitly constructed object with no global
//! state, so tests can point it at a fake provider.
//!
//! # Example
//!
//! ```ignore
//! use jotter_auth::federation::{Authenticator, IdentityProviderConfig};
//!
//! let authenticator = Authenticator::new(provider_config, callback_url);
//!
//! // Step 1: send the browser to the provider
//! let login = authenticator.begin_login().await?;
//! // redirect to login.authorization_url, remember login.ticket
//!
//! // Step 2: the provider redirects back with a code
//! let profile = authenticator.complete_login(&code, &ticket.verifier).await?;
//! ```

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::discovery::DiscoveryCache;
use super::pkce::{PkceChallenge, PkceVerifier};
use super::profile::ExternalProfile;
use super::provider::IdentityProviderConfig;
use super::ticket::LoginTicket;
use crate::error::{AuthError, AuthResult};

/// HTTP timeout for provider calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A started login: where to send the browser, and what to remember.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// The provider authorization URL to redirect the browser to.
    pub authorization_url: Url,

    /// The pending-login state to carry across the round-trip.
    pub ticket: LoginTicket,
}

/// Token endpoint response, per RFC 6749 §5.1.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: String,
    #[serde(default)]
    #[allow(dead_code)]
    id_token: Option<String>,
}

/// Token endpoint error response, per RFC 6749 §5.2.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Drives the OAuth handshake with one external identity provider.
pub struct Authenticator {
    provider: IdentityProviderConfig,
    callback_url: String,
    http_client: reqwest::Client,
    discovery: DiscoveryCache,
}

impl Authenticator {
    /// Creates an authenticator for the configured provider.
    #[must_use]
    pub fn new(provider: IdentityProviderConfig, callback_url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        let discovery =
            DiscoveryCache::new(http_client.clone(), provider.issuer.clone(), &provider.id);

        Self {
            provider,
            callback_url: callback_url.into(),
            http_client,
            discovery,
        }
    }

    /// Returns the provider configuration.
    #[must_use]
    pub fn provider(&self) -> &IdentityProviderConfig {
        &self.provider
    }

    /// Returns the provider id.
    #[must_use]
    pub fn provider_id(&self) -> &str {
        &self.provider.id
    }

    /// Starts a login: builds the provider authorization URL with PKCE.
    ///
    /// No server-side state is created; the returned ticket travels with
    /// the browser.
    ///
    /// # Errors
    ///
    /// Returns an error if endpoint discovery fails or the configured
    /// endpoint is not a valid URL.
    pub async fn begin_login(&self) -> AuthResult<LoginRequest> {
        let endpoint = self.authorization_endpoint().await?;

        let ticket = LoginTicket::generate();
        let challenge = PkceChallenge::from_verifier(&ticket.verifier);

        let mut url = endpoint;
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("response_type", "code");
            params.append_pair("client_id", &self.provider.client_id);
            params.append_pair("redirect_uri", &self.callback_url);
            params.append_pair("scope", &self.provider.scope_param());
            params.append_pair("state", &ticket.state);
            params.append_pair("code_challenge", challenge.as_str());
            params.append_pair("code_challenge_method", "S256");
        }

        tracing::debug!(provider = %self.provider.id, "Login started");

        Ok(LoginRequest {
            authorization_url: url,
            ticket,
        })
    }

    /// Completes a login: exchanges the authorization code for tokens and
    /// fetches the user's profile.
    ///
    /// The returned profile has passed [`ExternalProfile::validate`], so
    /// provisioning can rely on its subject id and email.
    ///
    /// # Errors
    ///
    /// Returns a `Provider` error when the exchange or the userinfo fetch
    /// fails, and `MalformedProfile` when the provider returns a profile
    /// without a subject id or email.
    pub async fn complete_login(
        &self,
        code: &str,
        verifier: &PkceVerifier,
    ) -> AuthResult<ExternalProfile> {
        let access_token = self.exchange_code(code, verifier).await?;
        let profile = self.fetch_userinfo(&access_token).await?;
        profile.validate()?;
        Ok(profile)
    }

    async fn exchange_code(&self, code: &str, verifier: &PkceVerifier) -> AuthResult<String> {
        let endpoint = self.token_endpoint().await?;

        let mut form: Vec<(&str, &str)> = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.callback_url),
            ("client_id", &self.provider.client_id),
            ("code_verifier", verifier.as_str()),
        ];
        if let Some(secret) = &self.provider.client_secret {
            form.push(("client_secret", secret));
        }

        let response = self
            .http_client
            .post(endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.provider_error(format!("token exchange: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = match response.json::<TokenErrorResponse>().await {
                Ok(err) => format!(
                    "token exchange rejected: {}{}",
                    err.error,
                    err.error_description
                        .map(|d| format!(" ({d})"))
                        .unwrap_or_default()
                ),
                Err(_) => format!("token exchange returned HTTP {status}"),
            };
            return Err(self.provider_error(message));
        }

        let tokens = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| self.provider_error(format!("token response parse: {e}")))?;

        if tokens.access_token.is_empty() {
            return Err(self.provider_error("token response missing access_token"));
        }

        Ok(tokens.access_token)
    }

    async fn fetch_userinfo(&self, access_token: &str) -> AuthResult<ExternalProfile> {
        let endpoint = self.userinfo_endpoint().await?;

        let response = self
            .http_client
            .get(endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| self.provider_error(format!("userinfo fetch: {e}")))?;

        if !response.status().is_success() {
            return Err(self.provider_error(format!(
                "userinfo returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<ExternalProfile>()
            .await
            .map_err(|e| self.provider_error(format!("userinfo parse: {e}")))
    }

    async fn authorization_endpoint(&self) -> AuthResult<Url> {
        match &self.provider.authorization_endpoint {
            Some(endpoint) => parse_endpoint(endpoint),
            None => parse_endpoint(&self.discovery.get().await?.authorization_endpoint),
        }
    }

    async fn token_endpoint(&self) -> AuthResult<Url> {
        match &self.provider.token_endpoint {
            Some(endpoint) => parse_endpoint(endpoint),
            None => parse_endpoint(&self.discovery.get().await?.token_endpoint),
        }
    }

    async fn userinfo_endpoint(&self) -> AuthResult<Url> {
        match &self.provider.userinfo_endpoint {
            Some(endpoint) => parse_endpoint(endpoint),
            None => {
                let discovered = self.discovery.get().await?.userinfo_endpoint.ok_or_else(|| {
                    AuthError::configuration("provider advertises no userinfo endpoint")
                })?;
                parse_endpoint(&discovered)
            }
        }
    }

    fn provider_error(&self, message: impl Into<String>) -> AuthError {
        AuthError::provider(&self.provider.id, message)
    }
}

fn parse_endpoint(endpoint: &str) -> AuthResult<Url> {
    Url::parse(endpoint)
        .map_err(|e| AuthError::configuration(format!("invalid provider endpoint: {e}")))
}
