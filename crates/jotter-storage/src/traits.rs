//! Post storage trait.
//!
//! Defines the interface for post persistence operations. Implementations
//! are provided by storage backends (e.g., PostgreSQL).

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageResult;
use crate::post::{NewPost, Post, PostUpdate, PostWithAuthor};
use crate::search::{Page, PostQuery};

/// Storage trait for posts.
///
/// Handlers perform the ownership check themselves, between `find_by_id`
/// and `update`/`delete`; implementations only persist. This keeps the
/// authorization decision in one auditable place instead of scattering it
/// through SQL `WHERE` clauses.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Creates a new post and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    async fn create(&self, post: NewPost) -> StorageResult<Post>;

    /// Finds a post by id.
    ///
    /// Returns `None` if no post with that id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Post>>;

    /// Finds a post by id joined with its author's name and email.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn find_with_author(&self, id: Uuid) -> StorageResult<Option<PostWithAuthor>>;

    /// Lists posts matching the query, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn search(&self, query: &PostQuery) -> StorageResult<Page<PostWithAuthor>>;

    /// Applies a partial update and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the post does not exist, or an error if the
    /// update fails.
    async fn update(&self, id: Uuid, update: &PostUpdate) -> StorageResult<Post>;

    /// Deletes a post.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the post does not exist, or an error if the
    /// delete fails.
    async fn delete(&self, id: Uuid) -> StorageResult<()>;
}
