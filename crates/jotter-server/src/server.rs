use std::net::SocketAddr;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use jotter_auth::http as auth_http;

use crate::{bootstrap, config::AppConfig, handlers, routes, state::AppState, state::AppStores};

pub struct JotterServer {
    addr: SocketAddr,
    app: Router,
}

/// Builds the router over an already-constructed state.
///
/// Tests call this directly with in-memory stores; production goes through
/// [`ServerBuilder`].
pub fn build_app(state: AppState) -> Router {
    if !state.auth_config().session.secure_cookies {
        // Acceptable only for plain-HTTP local development.
        tracing::warn!("secure_cookies is disabled; session cookies will be sent over plain HTTP");
    }

    let cors = cors_layer(&state.config);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        // Federated login and session surface
        .route("/auth/{provider}", get(auth_http::login_handler))
        .route("/auth/{provider}/callback", get(auth_http::callback_handler))
        .route("/auth/logout", get(auth_http::logout_handler))
        .route("/auth/user", get(auth_http::current_user_handler))
        // Posts
        .route(
            "/posts",
            get(routes::posts::search_posts).post(routes::posts::create_post),
        )
        .route(
            "/posts/{id}",
            get(routes::posts::get_post)
                .patch(routes::posts::update_post)
                .delete(routes::posts::delete_post),
        )
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.server.body_limit_bytes,
        ))
        .with_state(state)
}

/// CORS restricted to the configured front-end origin, with credentials so
/// the session cookie travels on cross-origin API calls.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origin = config
        .frontend
        .origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000"));

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

pub struct ServerBuilder {
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Connects storage and assembles the server.
    pub async fn build(self) -> anyhow::Result<JotterServer> {
        let addr = self.config.addr();
        let stores: AppStores = bootstrap::init_storage(&self.config).await?;
        let state = AppState::new(self.config, stores);

        spawn_session_cleanup(state.auth.sessions.clone());

        let app = build_app(state);

        Ok(JotterServer { addr, app })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl JotterServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

/// Periodically deletes expired sessions so the store does not grow
/// unbounded.
fn spawn_session_cleanup(sessions: jotter_auth::SessionManager) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match sessions.cleanup_expired().await {
                Ok(deleted) if deleted > 0 => {
                    tracing::info!(deleted, "Expired sessions removed");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Session cleanup failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
