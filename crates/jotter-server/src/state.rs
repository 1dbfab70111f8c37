//! Application state.

use std::sync::Arc;

use axum::extract::FromRef;

use jotter_auth::http::AuthHttpState;
use jotter_auth::session::SessionManager;
use jotter_auth::storage::{IdentityStore, SessionStore};
use jotter_auth::{Authenticator, config::AuthConfig};
use jotter_storage::PostStore;

use crate::config::AppConfig;

/// The storage backends the application runs on.
///
/// Production wires these to PostgreSQL in [`crate::bootstrap`]; tests pass
/// in-memory implementations.
#[derive(Clone)]
pub struct AppStores {
    /// Users and federated credentials.
    pub identity: Arc<dyn IdentityStore>,
    /// Login sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// Posts.
    pub posts: Arc<dyn PostStore>,
}

/// Shared application state for the router.
#[derive(Clone)]
pub struct AppState {
    /// Full application configuration.
    pub config: Arc<AppConfig>,
    /// State for the `/auth/*` handlers.
    pub auth: AuthHttpState,
    /// Post storage.
    pub posts: Arc<dyn PostStore>,
}

impl AppState {
    /// Builds the application state from configuration and storage.
    #[must_use]
    pub fn new(config: AppConfig, stores: AppStores) -> Self {
        let auth_config = Arc::new(config.auth.clone());

        let authenticator = Arc::new(Authenticator::new(
            auth_config.provider.clone(),
            auth_config.callback_url.clone(),
        ));

        let sessions = SessionManager::new(
            stores.sessions,
            stores.identity.clone(),
            auth_config.session.clone(),
        );

        let auth = AuthHttpState::new(
            authenticator,
            stores.identity,
            sessions,
            Arc::clone(&auth_config),
        );

        Self {
            config: Arc::new(config),
            auth,
            posts: stores.posts,
        }
    }

    /// Returns the auth configuration.
    #[must_use]
    pub fn auth_config(&self) -> &AuthConfig {
        &self.auth.config
    }
}

impl FromRef<AppState> for AuthHttpState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self {
        state.auth.sessions.clone()
    }
}
