//! OpenID Connect Discovery Document types.
//!
//! Defines the subset of provider metadata jotter reads from the
//! `.well-known/openid-configuration` endpoint, per
//! [OpenID Connect Discovery 1.0](https://openid.net/specs/openid-connect-discovery-1_0.html).

use serde::{Deserialize, Serialize};

/// OpenID Connect Discovery Document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcDiscoveryDocument {
    /// URL that the OP asserts as its Issuer Identifier.
    pub issuer: String,

    /// URL of the OP's Authorization Endpoint.
    pub authorization_endpoint: String,

    /// URL of the OP's Token Endpoint.
    pub token_endpoint: String,

    /// URL of the OP's UserInfo Endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,

    /// OAuth 2.0 scope values this server supports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes_supported: Option<Vec<String>>,

    /// OAuth 2.0 response_type values this OP supports.
    #[serde(default)]
    pub response_types_supported: Vec<String>,

    /// PKCE code challenge methods supported by this server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge_methods_supported: Option<Vec<String>>,
}

impl OidcDiscoveryDocument {
    /// Returns `true` if this provider supports the specified response type.
    #[must_use]
    pub fn supports_response_type(&self, response_type: &str) -> bool {
        self.response_types_supported
            .iter()
            .any(|rt| rt == response_type)
    }

    /// Returns `true` if this provider supports PKCE with the specified
    /// method.
    #[must_use]
    pub fn supports_pkce_method(&self, method: &str) -> bool {
        self.code_challenge_methods_supported
            .as_ref()
            .is_some_and(|methods| methods.iter().any(|m| m == method))
    }
}
