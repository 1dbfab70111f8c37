//! PostgreSQL storage backend for Jotter.
//!
//! Provides persistent storage for:
//!
//! - Users and federated credentials (`IdentityStore`)
//! - Login sessions (`SessionStore`)
//! - Posts (`PostStore`)
//!
//! plus the idempotent schema bootstrap and an optional demo seed.
//!
//! # Example
//!
//! ```ignore
//! use jotter_postgres::PostgresStorage;
//!
//! let storage = PostgresStorage::connect("postgres://localhost/jotter", 10).await?;
//! jotter_postgres::schema::ensure_schema(storage.pool()).await?;
//!
//! let identity = storage.identity();
//! let user = identity.find_user(user_id).await?;
//! ```

pub mod identity;
pub mod post;
pub mod schema;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use sqlx_core::pool::{Pool, PoolOptions};
use sqlx_postgres::Postgres;

use jotter_storage::{StorageError, StorageResult};

pub use identity::PostgresIdentityStore;
pub use post::PostgresPostStore;
pub use session::PostgresSessionStore;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

/// PostgreSQL storage backend.
///
/// Holds a connection pool and hands out the per-concern store types.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: Arc<PgPool>,
}

impl PostgresStorage {
    /// Create new storage with an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create new storage by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str, pool_size: u32) -> StorageResult<Self> {
        let pool = PoolOptions::<Postgres>::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(StorageError::from)?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get a reference to the Arc-wrapped pool.
    #[must_use]
    pub fn pool_arc(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    // -------------------------------------------------------------------------
    // Store Accessors
    // -------------------------------------------------------------------------

    /// Get the identity store (users and federated credentials).
    #[must_use]
    pub fn identity(&self) -> PostgresIdentityStore {
        PostgresIdentityStore::new(self.pool_arc())
    }

    /// Get the session store.
    #[must_use]
    pub fn sessions(&self) -> PostgresSessionStore {
        PostgresSessionStore::new(self.pool_arc())
    }

    /// Get the post store.
    #[must_use]
    pub fn posts(&self) -> PostgresPostStore {
        PostgresPostStore::new(self.pool_arc())
    }
}
