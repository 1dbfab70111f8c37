//! External identity provider configuration.

use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the external identity provider.
///
/// Represents an OIDC-compatible identity provider. Endpoints are normally
/// discovered from the issuer's metadata; the explicit fields below
/// override discovery (useful for tests and non-standard providers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProviderConfig {
    /// Unique identifier for this provider (e.g., "google").
    pub id: String,

    /// Human-readable name for display (e.g., "Google").
    pub name: String,

    /// The OIDC issuer URL (e.g., "https://accounts.google.com").
    pub issuer: Url,

    /// OAuth client ID registered with the provider.
    pub client_id: String,

    /// OAuth client secret (None for public clients).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// OAuth scopes to request.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Optional override for the authorization endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,

    /// Optional override for the token endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,

    /// Optional override for the userinfo endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,
}

fn default_scopes() -> Vec<String> {
    vec![
        "openid".to_string(),
        "profile".to_string(),
        "email".to_string(),
    ]
}

impl Default for IdentityProviderConfig {
    fn default() -> Self {
        Self::new(
            "google",
            "Google",
            Url::parse("https://accounts.google.com").expect("literal issuer URL"),
            "",
        )
    }
}

impl IdentityProviderConfig {
    /// Creates a new identity provider configuration with required fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        issuer: Url,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            issuer,
            client_id: client_id.into(),
            client_secret: None,
            scopes: default_scopes(),
            authorization_endpoint: None,
            token_endpoint: None,
            userinfo_endpoint: None,
        }
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets the OAuth scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<impl Into<String>>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the authorization endpoint override.
    #[must_use]
    pub fn with_authorization_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.authorization_endpoint = Some(endpoint.into());
        self
    }

    /// Sets the token endpoint override.
    #[must_use]
    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = Some(endpoint.into());
        self
    }

    /// Sets the userinfo endpoint override.
    #[must_use]
    pub fn with_userinfo_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.userinfo_endpoint = Some(endpoint.into());
        self
    }

    /// Returns `true` if all three endpoints are overridden, making
    /// discovery unnecessary.
    #[must_use]
    pub fn has_all_endpoints(&self) -> bool {
        self.authorization_endpoint.is_some()
            && self.token_endpoint.is_some()
            && self.userinfo_endpoint.is_some()
    }

    /// Returns the requested scopes joined for the authorization request.
    #[must_use]
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }
}
