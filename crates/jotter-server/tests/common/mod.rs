//! Shared test harness: in-memory stores, a wiremock identity provider and
//! an ephemeral server instance.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use url::Url;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockGuard, MockServer, ResponseTemplate};

use jotter_auth::error::AuthResult;
use jotter_auth::federation::IdentityProviderConfig;
use jotter_auth::storage::{FederatedCredential, IdentityStore, NewUser, SessionStore, User};
use jotter_server::{AppConfig, AppState, AppStores, build_app};
use jotter_storage::{
    NewPost, Page, Post, PostQuery, PostStore, PostUpdate, PostWithAuthor, StorageError,
    StorageResult,
};

pub const SUCCESS_URL: &str = "http://frontend.test/welcome";
pub const FAILURE_URL: &str = "http://frontend.test/login?error=1";

// =============================================================================
// In-memory stores
// =============================================================================

#[derive(Default)]
pub struct InMemoryIdentityStore {
    users: Mutex<HashMap<Uuid, User>>,
    credentials: Mutex<Vec<FederatedCredential>>,
}

impl InMemoryIdentityStore {
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn credential_count(&self) -> usize {
        self.credentials.lock().unwrap().len()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_user(&self, id: Uuid) -> AuthResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_credential(
        &self,
        provider: &str,
        subject: &str,
    ) -> AuthResult<Option<FederatedCredential>> {
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.provider == provider && c.subject == subject)
            .cloned())
    }

    async fn create_user_with_credential(
        &self,
        user: NewUser,
        provider: &str,
        subject: &str,
    ) -> AuthResult<User> {
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            profile_picture: user.profile_picture,
            created_at: OffsetDateTime::now_utc(),
        };
        self.users
            .lock()
            .unwrap()
            .insert(created.id, created.clone());
        self.credentials.lock().unwrap().push(FederatedCredential {
            provider: provider.to_string(),
            subject: subject.to_string(),
            user_id: created.id,
        });
        Ok(created)
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, (Uuid, OffsetDateTime)>>,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: OffsetDateTime,
    ) -> AuthResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(token.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn resolve(
        &self,
        token: &str,
        new_expires_at: OffsetDateTime,
    ) -> AuthResult<Option<Uuid>> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(token) {
            Some((user_id, expires_at)) if *expires_at > OffsetDateTime::now_utc() => {
                *expires_at = new_expires_at;
                Ok(Some(*user_id))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, token: &str) -> AuthResult<()> {
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut sessions = self.sessions.lock().unwrap();
        let now = OffsetDateTime::now_utc();
        let before = sessions.len();
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryPostStore {
    posts: Mutex<Vec<Post>>,
    authors: Mutex<HashMap<Uuid, (String, String)>>,
}

impl InMemoryPostStore {
    /// Registers an author so the joined views can resolve names.
    pub fn register_author(&self, user: &User) {
        self.authors
            .lock()
            .unwrap()
            .insert(user.id, (user.name.clone(), user.email.clone()));
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    fn with_author(&self, post: Post) -> PostWithAuthor {
        let authors = self.authors.lock().unwrap();
        let (name, email) = authors
            .get(&post.user_id)
            .cloned()
            .unwrap_or_else(|| ("unknown".to_string(), "unknown@test".to_string()));
        PostWithAuthor {
            post,
            author_name: name,
            author_email: email,
        }
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn create(&self, post: NewPost) -> StorageResult<Post> {
        let now = OffsetDateTime::now_utc();
        let created = Post {
            id: Uuid::new_v4(),
            user_id: post.user_id,
            title: post.title,
            description: post.description,
            tags: post.tags,
            status: post.status,
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Post>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn find_with_author(&self, id: Uuid) -> StorageResult<Option<PostWithAuthor>> {
        Ok(self.find_by_id(id).await?.map(|p| self.with_author(p)))
    }

    async fn search(&self, query: &PostQuery) -> StorageResult<Page<PostWithAuthor>> {
        let posts = self.posts.lock().unwrap();
        let needle = query.q.as_deref().unwrap_or_default().to_lowercase();

        let mut matches: Vec<Post> = posts
            .iter()
            .filter(|p| {
                (needle.is_empty()
                    || p.title.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle))
                    && query.tag.as_ref().is_none_or(|t| p.tags.contains(t))
                    && query.status.is_none_or(|s| p.status == s)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matches.len() as u64;
        let items: Vec<PostWithAuthor> = matches
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.per_page() as usize)
            .map(|p| self.with_author(p))
            .collect();

        Ok(Page::new(items, query, total))
    }

    async fn update(&self, id: Uuid, update: &PostUpdate) -> StorageResult<Post> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StorageError::not_found(format!("Post {id}")))?;
        update.apply(post);
        post.updated_at = OffsetDateTime::now_utc();
        Ok(post.clone())
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(StorageError::not_found(format!("Post {id}")));
        }
        Ok(())
    }
}

// =============================================================================
// Test application
// =============================================================================

pub struct TestApp {
    pub base: String,
    pub provider: MockServer,
    pub identity: Arc<InMemoryIdentityStore>,
    pub sessions: Arc<InMemorySessionStore>,
    pub posts: Arc<InMemoryPostStore>,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.abort();
    }
}

/// Starts the app on an ephemeral port with in-memory stores and a fake
/// identity provider.
pub async fn spawn_app() -> TestApp {
    let provider = MockServer::start().await;
    let provider_base = provider.uri();

    let mut cfg = AppConfig::default();
    cfg.auth.provider = IdentityProviderConfig::new(
        "google",
        "Google",
        Url::parse(&provider_base).expect("mock server URL"),
        "client-123",
    )
    .with_client_secret("secret-456")
    .with_authorization_endpoint(format!("{provider_base}/authorize"))
    .with_token_endpoint(format!("{provider_base}/token"))
    .with_userinfo_endpoint(format!("{provider_base}/userinfo"));
    cfg.auth.callback_url = "http://127.0.0.1/auth/google/callback".to_string();
    cfg.auth.session.secret = "0123456789abcdef0123456789abcdef".to_string();
    cfg.auth.session.secure_cookies = false;
    cfg.auth.redirect.success_url = SUCCESS_URL.to_string();
    cfg.auth.redirect.failure_url = FAILURE_URL.to_string();
    cfg.frontend.origin = "http://frontend.test".to_string();

    let identity = Arc::new(InMemoryIdentityStore::default());
    let sessions = Arc::new(InMemorySessionStore::default());
    let posts = Arc::new(InMemoryPostStore::default());

    let stores = AppStores {
        identity: identity.clone(),
        sessions: sessions.clone(),
        posts: posts.clone(),
    };

    let app = build_app(AppState::new(cfg, stores));

    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    TestApp {
        base: format!("http://{addr}"),
        provider,
        identity,
        sessions,
        posts,
        shutdown: Some(tx),
        handle,
    }
}

/// A browser-like client: cookie jar on, redirects off so each hop can be
/// asserted.
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("build client")
}

/// Mounts provider responses for one login and drives the full redirect
/// round-trip. Returns a client holding the session cookie.
pub async fn login_as(app: &TestApp, subject: &str, name: &str, email: &str) -> reqwest::Client {
    let _token_mock = mount_token_endpoint(app, subject).await;
    let _userinfo_mock = mount_userinfo(app, subject, Some(name), Some(email)).await;

    let client = browser();

    // Step 1: begin login, capture the state from the provider redirect.
    let response = client
        .get(app.url("/auth/google"))
        .send()
        .await
        .expect("begin login");
    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("authorization redirect");
    let authorize_url = Url::parse(location).expect("authorization URL");
    let state = authorize_url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("state parameter");

    // Step 2: the provider calls back with a code.
    let response = client
        .get(app.url(&format!(
            "/auth/google/callback?code=code-{subject}&state={state}"
        )))
        .send()
        .await
        .expect("callback");
    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("post-login redirect");
    assert_eq!(location, SUCCESS_URL, "login should land on the front-end");

    client
}

/// Mounts a token endpoint that accepts any code for this login.
pub async fn mount_token_endpoint(app: &TestApp, subject: &str) -> MockGuard {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": format!("at-{subject}"),
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount_as_scoped(&app.provider)
        .await
}

/// Mounts a userinfo endpoint returning the given profile.
pub async fn mount_userinfo(
    app: &TestApp,
    subject: &str,
    name: Option<&str>,
    email: Option<&str>,
) -> MockGuard {
    let mut profile = serde_json::json!({ "sub": subject });
    if let Some(name) = name {
        profile["name"] = serde_json::json!(name);
    }
    if let Some(email) = email {
        profile["email"] = serde_json::json!(email);
    }

    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile))
        .mount_as_scoped(&app.provider)
        .await
}

/// Fetches the caller's user record via the API.
pub async fn current_user(app: &TestApp, client: &reqwest::Client) -> serde_json::Value {
    let response = client
        .get(app.url("/auth/user"))
        .send()
        .await
        .expect("get current user");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response.json().await.expect("user json")
}
