//! Session storage.
//!
//! Sessions are a token-keyed table. Resolution refreshes the idle expiry
//! and reads the user id in a single conditional update, so concurrent
//! requests bearing the same token need no further coordination.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use time::OffsetDateTime;
use uuid::Uuid;

use jotter_auth::error::AuthResult;
use jotter_auth::storage::SessionStore;
use jotter_storage::StorageError;

use crate::PgPool;

/// PostgreSQL implementation of the session store.
pub struct PostgresSessionStore {
    pool: Arc<PgPool>,
}

impl PostgresSessionStore {
    /// Create a new session store with a connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: OffsetDateTime,
    ) -> AuthResult<()> {
        query(
            r#"
            INSERT INTO sessions (token, user_id, created_at, expires_at)
            VALUES ($1, $2, NOW(), $3)
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(&*self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(())
    }

    async fn resolve(
        &self,
        token: &str,
        new_expires_at: OffsetDateTime,
    ) -> AuthResult<Option<Uuid>> {
        let user_id: Option<Uuid> = query_scalar(
            r#"
            UPDATE sessions
            SET expires_at = $2
            WHERE token = $1
              AND expires_at > NOW()
            RETURNING user_id
            "#,
        )
        .bind(token)
        .bind(new_expires_at)
        .fetch_optional(&*self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(user_id)
    }

    async fn delete(&self, token: &str) -> AuthResult<()> {
        // Deleting a missing token is a success: logout is idempotent.
        query(
            r#"
            DELETE FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .execute(&*self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let result = query(
            r#"
            DELETE FROM sessions
            WHERE expires_at <= NOW()
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(StorageError::from)?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            tracing::debug!(deleted, "Cleaned up expired sessions");
        }
        Ok(deleted)
    }
}
