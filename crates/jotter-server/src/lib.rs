//! Jotter server library.
//!
//! Assembles the HTTP application: configuration, observability, storage
//! bootstrap, router and handlers. The binary in `main.rs` is a thin
//! wrapper over [`ServerBuilder`].

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod routes;
pub mod server;
pub mod state;

pub use config::AppConfig;
pub use server::{JotterServer, ServerBuilder, build_app};
pub use state::{AppState, AppStores};
