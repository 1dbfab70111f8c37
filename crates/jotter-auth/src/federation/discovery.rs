//! OIDC discovery document fetching and caching.

use tokio::sync::RwLock;
use url::Url;

use super::oidc::OidcDiscoveryDocument;
use crate::error::{AuthError, AuthResult};

/// Well-known path for OIDC discovery documents.
const DISCOVERY_PATH: &str = ".well-known/openid-configuration";

/// Fetches and caches the provider's discovery document.
///
/// Jotter talks to a single issuer, so the cache is a single slot filled
/// on first use. Discovery documents change rarely; the cache lives for
/// the process lifetime.
pub struct DiscoveryCache {
    http_client: reqwest::Client,
    issuer: Url,
    provider_id: String,
    cached: RwLock<Option<OidcDiscoveryDocument>>,
}

impl DiscoveryCache {
    /// Creates a cache for the given issuer.
    #[must_use]
    pub fn new(http_client: reqwest::Client, issuer: Url, provider_id: impl Into<String>) -> Self {
        Self {
            http_client,
            issuer,
            provider_id: provider_id.into(),
            cached: RwLock::new(None),
        }
    }

    /// Returns the discovery document, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns a `Provider` error if the document cannot be fetched or
    /// parsed.
    pub async fn get(&self) -> AuthResult<OidcDiscoveryDocument> {
        if let Some(doc) = self.cached.read().await.as_ref() {
            return Ok(doc.clone());
        }

        let doc = self.fetch().await?;

        let mut cached = self.cached.write().await;
        *cached = Some(doc.clone());
        Ok(doc)
    }

    async fn fetch(&self) -> AuthResult<OidcDiscoveryDocument> {
        let url = self.discovery_url()?;

        tracing::debug!(url = %url, "Fetching OIDC discovery document");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::provider(&self.provider_id, format!("discovery fetch: {e}")))?;

        if !response.status().is_success() {
            return Err(AuthError::provider(
                &self.provider_id,
                format!("discovery returned HTTP {}", response.status()),
            ));
        }

        response
            .json::<OidcDiscoveryDocument>()
            .await
            .map_err(|e| AuthError::provider(&self.provider_id, format!("discovery parse: {e}")))
    }

    fn discovery_url(&self) -> AuthResult<Url> {
        // The well-known path is resolved under the issuer path, which must
        // therefore end with a slash for Url::join to append rather than
        // replace.
        let mut base = self.issuer.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(DISCOVERY_PATH)
            .map_err(|e| AuthError::configuration(format!("invalid issuer URL: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn discovery_body(base: &str) -> serde_json::Value {
        serde_json::json!({
            "issuer": base,
            "authorization_endpoint": format!("{base}/authorize"),
            "token_endpoint": format!("{base}/token"),
            "userinfo_endpoint": format!("{base}/userinfo"),
            "response_types_supported": ["code"],
            "code_challenge_methods_supported": ["S256"]
        })
    }

    #[tokio::test]
    async fn test_fetch_and_cache() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/.well-known/openid-configuration"))
            .respond_with(ResponseTemplate::new(200).set_body_json(discovery_body(&server.uri())))
            .expect(1) // second get() must hit the cache
            .mount(&server)
            .await;

        let issuer = Url::parse(&server.uri()).unwrap();
        let cache = DiscoveryCache::new(reqwest::Client::new(), issuer, "test");

        let doc = cache.get().await.unwrap();
        assert_eq!(doc.authorization_endpoint, format!("{}/authorize", server.uri()));

        let doc = cache.get().await.unwrap();
        assert!(doc.supports_pkce_method("S256"));
    }

    #[tokio::test]
    async fn test_fetch_error_is_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/.well-known/openid-configuration"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let issuer = Url::parse(&server.uri()).unwrap();
        let cache = DiscoveryCache::new(reqwest::Client::new(), issuer, "test");

        let err = cache.get().await.unwrap_err();
        assert!(matches!(err, AuthError::Provider { .. }));
    }
}
