//! Storage bootstrap.
//!
//! Connects the PostgreSQL pool, applies the schema, optionally seeds demo
//! data, and wires the concrete stores behind the trait objects the rest
//! of the application consumes.

use std::sync::Arc;

use jotter_postgres::{PostgresStorage, schema};
use jotter_storage::{StorageError, StorageResult};

use crate::config::AppConfig;
use crate::state::AppStores;

/// Connects storage and prepares it per the bootstrap configuration.
///
/// # Errors
///
/// Returns an error if the connection, schema application or seed fails.
pub async fn init_storage(config: &AppConfig) -> StorageResult<AppStores> {
    let pg = config
        .storage
        .postgres
        .as_ref()
        .ok_or_else(|| StorageError::invalid_input("storage.postgres config is required"))?;

    let storage = PostgresStorage::connect(&pg.connection_url(), pg.pool_size).await?;
    tracing::info!(
        host = %pg.host,
        database = %pg.database,
        pool_size = pg.pool_size,
        "Connected to PostgreSQL"
    );

    if config.bootstrap.ensure_schema {
        schema::ensure_schema(storage.pool()).await?;
    }
    if config.bootstrap.seed_demo {
        schema::seed_demo(storage.pool()).await?;
    }

    Ok(AppStores {
        identity: Arc::new(storage.identity()),
        sessions: Arc::new(storage.sessions()),
        posts: Arc::new(storage.posts()),
    })
}
