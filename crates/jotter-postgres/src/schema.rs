//! Schema bootstrap and demo seed.
//!
//! The DDL is idempotent (`IF NOT EXISTS` throughout) and applied
//! statement by statement at startup when enabled in the bootstrap
//! configuration.

use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use uuid::Uuid;

use jotter_storage::{StorageError, StorageResult};

use crate::PgPool;

/// The relational schema.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    profile_picture TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS federated_credentials (
    provider TEXT NOT NULL,
    subject TEXT NOT NULL,
    user_id UUID NOT NULL REFERENCES users(id),
    PRIMARY KEY (provider, subject)
);

CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    expires_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions (expires_at);

CREATE TABLE IF NOT EXISTS posts (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    tags TEXT[] NOT NULL DEFAULT '{}',
    status TEXT NOT NULL DEFAULT 'draft',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_posts_user_id ON posts (user_id);
CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts (created_at DESC);
"#;

/// Demo users inserted by the seed: (name, email).
const DEMO_USERS: &[(&str, &str)] = &[
    ("Ana Lima", "ana@example.com"),
    ("Ben Okafor", "ben@example.com"),
    ("Carla Voss", "carla@example.com"),
];

/// Demo posts inserted by the seed: (title, description, tags, status).
const DEMO_POSTS: &[(&str, &str, &[&str], &str)] = &[
    (
        "Hello, jotter",
        "A first post to prove the pipeline works end to end.",
        &["intro"],
        "published",
    ),
    (
        "Field notes",
        "Things noticed while wiring up federated login.",
        &["notes", "auth"],
        "published",
    ),
    (
        "Unfinished thought",
        "Saved for later.",
        &["notes"],
        "draft",
    ),
];

/// Splits the schema into statements and applies each one.
///
/// # Errors
///
/// Returns an error if any statement fails.
pub async fn ensure_schema(pool: &PgPool) -> StorageResult<()> {
    let statements = SCHEMA
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty());

    for statement in statements {
        query(statement)
            .execute(pool)
            .await
            .map_err(StorageError::from)?;
    }

    tracing::info!("Database schema ensured");
    Ok(())
}

/// Seeds demo users and posts.
///
/// Skipped when the users table is non-empty, so the seed never touches a
/// store with real data.
///
/// # Errors
///
/// Returns an error if a query fails.
pub async fn seed_demo(pool: &PgPool) -> StorageResult<bool> {
    let user_count: i64 = query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .map_err(StorageError::from)?;

    if user_count > 0 {
        tracing::debug!("Skipping demo seed, users table is not empty");
        return Ok(false);
    }

    let mut user_ids = Vec::with_capacity(DEMO_USERS.len());
    for (name, email) in DEMO_USERS {
        let id = Uuid::new_v4();
        query(
            r#"
            INSERT INTO users (id, name, email, created_at)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .execute(pool)
        .await
        .map_err(StorageError::from)?;
        user_ids.push(id);
    }

    for (index, (title, description, tags, status)) in DEMO_POSTS.iter().enumerate() {
        let owner = user_ids[index % user_ids.len()];
        let tags: Vec<String> = tags.iter().map(ToString::to_string).collect();
        query(
            r#"
            INSERT INTO posts (id, user_id, title, description, tags, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(title)
        .bind(description)
        .bind(&tags)
        .bind(status)
        .execute(pool)
        .await
        .map_err(StorageError::from)?;
    }

    tracing::info!(
        users = DEMO_USERS.len(),
        posts = DEMO_POSTS.len(),
        "Seeded demo data"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_splits_into_statements() {
        let statements: Vec<&str> = SCHEMA
            .split(';')
            .map(str::trim)
            .filter(|stmt| !stmt.is_empty())
            .collect();

        assert!(statements.len() >= 7);
        assert!(statements.iter().all(|s| s.starts_with("CREATE")));
    }

    #[test]
    fn test_demo_post_statuses_are_valid() {
        use jotter_storage::PostStatus;
        for (_, _, _, status) in DEMO_POSTS {
            assert!(PostStatus::parse(status).is_some(), "bad status {status}");
        }
    }
}
