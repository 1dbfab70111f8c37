//! Identity storage.
//!
//! Stores users and their federated credentials. The first-login path
//! inserts the user and the credential in one transaction so a crash
//! between the two statements cannot leave a user with no resolvable
//! credential.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use jotter_auth::error::AuthResult;
use jotter_auth::storage::{FederatedCredential, IdentityStore, NewUser, User};
use jotter_storage::StorageError;

use crate::PgPool;

/// Database row shape for users.
type UserRow = (Uuid, String, String, Option<String>, OffsetDateTime);

fn user_from_row(row: UserRow) -> User {
    User {
        id: row.0,
        name: row.1,
        email: row.2,
        profile_picture: row.3,
        created_at: row.4,
    }
}

/// PostgreSQL implementation of the identity store.
pub struct PostgresIdentityStore {
    pool: Arc<PgPool>,
}

impl PostgresIdentityStore {
    /// Create a new identity store with a connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn find_user(&self, id: Uuid) -> AuthResult<Option<User>> {
        let row: Option<UserRow> = query_as(
            r#"
            SELECT id, name, email, profile_picture, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(row.map(user_from_row))
    }

    async fn find_credential(
        &self,
        provider: &str,
        subject: &str,
    ) -> AuthResult<Option<FederatedCredential>> {
        let row: Option<(String, String, Uuid)> = query_as(
            r#"
            SELECT provider, subject, user_id
            FROM federated_credentials
            WHERE provider = $1
              AND subject = $2
            "#,
        )
        .bind(provider)
        .bind(subject)
        .fetch_optional(&*self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(row.map(|(provider, subject, user_id)| FederatedCredential {
            provider,
            subject,
            user_id,
        }))
    }

    async fn create_user_with_credential(
        &self,
        user: NewUser,
        provider: &str,
        subject: &str,
    ) -> AuthResult<User> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let id = Uuid::new_v4();
        let row: UserRow = query_as(
            r#"
            INSERT INTO users (id, name, email, profile_picture, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, name, email, profile_picture, created_at
            "#,
        )
        .bind(id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.profile_picture)
        .fetch_one(&mut *tx)
        .await
        .map_err(StorageError::from)?;

        query(
            r#"
            INSERT INTO federated_credentials (provider, subject, user_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(provider)
        .bind(subject)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx_core::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StorageError::conflict(format!(
                    "credential ({provider}, {subject}) already linked"
                ));
            }
            StorageError::from(e)
        })?;

        tx.commit().await.map_err(StorageError::from)?;

        tracing::info!(user_id = %id, provider = %provider, "Created user with federated credential");
        Ok(user_from_row(row))
    }
}
