//! Post storage.
//!
//! Plain typed columns; tags are a PostgreSQL text array. Ownership checks
//! happen in the handlers between load and mutate, so every statement here
//! is keyed by id alone.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_core::query_scalar::query_scalar;
use time::OffsetDateTime;
use uuid::Uuid;

use jotter_storage::{
    NewPost, Page, Post, PostQuery, PostStatus, PostStore, PostUpdate, PostWithAuthor,
    StorageError, StorageResult,
};

use crate::PgPool;

/// Database row shape for posts.
type PostRow = (
    Uuid,
    Uuid,
    String,
    String,
    Vec<String>,
    String,
    OffsetDateTime,
    OffsetDateTime,
);

/// Database row shape for posts joined with their author.
type PostAuthorRow = (
    Uuid,
    Uuid,
    String,
    String,
    Vec<String>,
    String,
    OffsetDateTime,
    OffsetDateTime,
    String,
    String,
);

fn post_from_row(row: PostRow) -> StorageResult<Post> {
    let status = PostStatus::parse(&row.5)
        .ok_or_else(|| StorageError::invalid_input(format!("unknown post status '{}'", row.5)))?;
    Ok(Post {
        id: row.0,
        user_id: row.1,
        title: row.2,
        description: row.3,
        tags: row.4,
        status,
        created_at: row.6,
        updated_at: row.7,
    })
}

fn post_author_from_row(row: PostAuthorRow) -> StorageResult<PostWithAuthor> {
    let (author_name, author_email) = (row.8.clone(), row.9.clone());
    let post = post_from_row((
        row.0, row.1, row.2, row.3, row.4, row.5, row.6, row.7,
    ))?;
    Ok(PostWithAuthor {
        post,
        author_name,
        author_email,
    })
}

/// Escapes LIKE wildcards in user-supplied search text.
fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// PostgreSQL implementation of the post store.
pub struct PostgresPostStore {
    pool: Arc<PgPool>,
}

impl PostgresPostStore {
    /// Create a new post store with a connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PostgresPostStore {
    async fn create(&self, post: NewPost) -> StorageResult<Post> {
        let row: PostRow = query_as(
            r#"
            INSERT INTO posts (id, user_id, title, description, tags, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING id, user_id, title, description, tags, status, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post.user_id)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.tags)
        .bind(post.status.as_str())
        .fetch_one(&*self.pool)
        .await?;

        post_from_row(row)
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Post>> {
        let row: Option<PostRow> = query_as(
            r#"
            SELECT id, user_id, title, description, tags, status, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        row.map(post_from_row).transpose()
    }

    async fn find_with_author(&self, id: Uuid) -> StorageResult<Option<PostWithAuthor>> {
        let row: Option<PostAuthorRow> = query_as(
            r#"
            SELECT p.id, p.user_id, p.title, p.description, p.tags, p.status,
                   p.created_at, p.updated_at, u.name, u.email
            FROM posts p
            JOIN users u ON p.user_id = u.id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        row.map(post_author_from_row).transpose()
    }

    async fn search(&self, query_params: &PostQuery) -> StorageResult<Page<PostWithAuthor>> {
        let text = query_params
            .q
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(escape_like);
        let tag = query_params.tag.as_deref().filter(|t| !t.is_empty());
        let status = query_params.status.map(|s| s.as_str());

        let total: i64 = query_scalar(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE ($1::text IS NULL
                   OR title ILIKE '%' || $1 || '%'
                   OR description ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR $2 = ANY(tags))
              AND ($3::text IS NULL OR status = $3)
            "#,
        )
        .bind(&text)
        .bind(tag)
        .bind(status)
        .fetch_one(&*self.pool)
        .await?;

        let rows: Vec<PostAuthorRow> = query_as(
            r#"
            SELECT p.id, p.user_id, p.title, p.description, p.tags, p.status,
                   p.created_at, p.updated_at, u.name, u.email
            FROM posts p
            JOIN users u ON p.user_id = u.id
            WHERE ($1::text IS NULL
                   OR p.title ILIKE '%' || $1 || '%'
                   OR p.description ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR $2 = ANY(p.tags))
              AND ($3::text IS NULL OR p.status = $3)
            ORDER BY p.created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&text)
        .bind(tag)
        .bind(status)
        .bind(i64::from(query_params.per_page()))
        .bind(query_params.offset() as i64)
        .fetch_all(&*self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(post_author_from_row)
            .collect::<StorageResult<Vec<_>>>()?;

        Ok(Page::new(items, query_params, total as u64))
    }

    async fn update(&self, id: Uuid, update: &PostUpdate) -> StorageResult<Post> {
        let row: Option<PostRow> = query_as(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                tags = COALESCE($4, tags),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, description, tags, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.tags)
        .bind(update.status.map(|s| s.as_str()))
        .fetch_optional(&*self.pool)
        .await?;

        row.map(post_from_row)
            .transpose()?
            .ok_or_else(|| StorageError::not_found(format!("Post {id}")))
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let result = query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(format!("Post {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_post_from_row_rejects_unknown_status() {
        let now = OffsetDateTime::now_utc();
        let row: PostRow = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            "t".to_string(),
            "d".to_string(),
            vec![],
            "bogus".to_string(),
            now,
            now,
        );
        let err = post_from_row(row).unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));
    }
}
