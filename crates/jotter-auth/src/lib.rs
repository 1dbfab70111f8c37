//! Authentication and authorization for Jotter.
//!
//! This crate owns the identity core of the service:
//!
//! - [`federation`]: the redirect handshake with the external identity
//!   provider and the resolution of provider profiles to local users
//! - [`session`]: opaque session tokens bridging a resolved user to a
//!   browser cookie and back
//! - [`extractors`]: the request-time guard: [`extractors::CurrentUser`]
//!   rejects unauthenticated callers, [`extractors::require_ownership`]
//!   rejects callers that do not own the target resource
//! - [`http`]: axum handlers for the `/auth/*` surface
//!
//! Storage is pluggable: the [`storage::IdentityStore`] and
//! [`storage::SessionStore`] traits are implemented by `jotter-postgres`
//! for production and by in-memory fakes in tests.

pub mod config;
pub mod error;
pub mod extractors;
pub mod federation;
pub mod http;
pub mod session;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{AuthConfig, RedirectConfig, SessionConfig};
pub use error::{AuthError, AuthResult};
pub use extractors::{CurrentUser, require_ownership};
pub use federation::authenticator::Authenticator;
pub use session::SessionManager;
pub use storage::{FederatedCredential, IdentityStore, NewUser, SessionStore, User};
