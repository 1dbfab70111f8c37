//! Resource route handlers.

pub mod posts;
