//! Federated authentication against an external identity provider.
//!
//! The flow is the OAuth 2.0 authorization-code handshake with PKCE:
//!
//! 1. [`authenticator::Authenticator::begin_login`]: build the provider
//!    authorization URL; the state and PKCE verifier travel in a signed,
//!    short-lived browser cookie, so no server-side state is created
//! 2. Provider redirects back with a code
//! 3. [`authenticator::Authenticator::complete_login`]: exchange the code
//!    for tokens and fetch the user's profile from the userinfo endpoint
//! 4. [`provisioning::resolve_user`]: map the profile to a local user,
//!    creating the user and its federated credential on first login

pub mod authenticator;
pub mod discovery;
pub mod oidc;
pub mod pkce;
pub mod profile;
pub mod provider;
pub mod provisioning;
pub mod ticket;

pub use authenticator::{Authenticator, LoginRequest};
pub use profile::ExternalProfile;
pub use provider::IdentityProviderConfig;
pub use provisioning::{ProvisioningAction, resolve_user};
pub use ticket::LoginTicket;
