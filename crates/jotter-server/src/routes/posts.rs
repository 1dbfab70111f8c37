//! Post CRUD and search handlers.
//!
//! Guard order on mutations is fixed: authenticate (401), load the target
//! (404), check ownership against the loaded row (403), then mutate. The
//! owner id never comes from the request body.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use jotter_auth::{CurrentUser, require_ownership};
use jotter_storage::{NewPost, Page, Post, PostQuery, PostStatus, PostUpdate, PostWithAuthor};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a post.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<PostStatus>,
}

/// Handler for `POST /posts`.
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::validation("title must not be empty"));
    }
    if body.description.trim().is_empty() {
        return Err(ApiError::validation("description must not be empty"));
    }

    let new_post = NewPost::new(user.id, body.title, body.description)
        .with_tags(body.tags)
        .with_status(body.status.unwrap_or_default());

    let post = state.posts.create(new_post).await?;
    tracing::info!(post_id = %post.id, user_id = %user.id, "Post created");

    Ok((StatusCode::CREATED, Json(post)))
}

/// Handler for `GET /posts`.
pub async fn search_posts(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> Result<Json<Page<PostWithAuthor>>, ApiError> {
    let page = state.posts.search(&query).await?;
    Ok(Json(page))
}

/// Handler for `GET /posts/{id}`.
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PostWithAuthor>, ApiError> {
    let post = state
        .posts
        .find_with_author(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {id}")))?;
    Ok(Json(post))
}

/// Handler for `PATCH /posts/{id}`.
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(update): Json<PostUpdate>,
) -> Result<Json<Post>, ApiError> {
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {id}")))?;

    require_ownership(user.id, post.user_id)?;

    if let Some(title) = &update.title
        && title.trim().is_empty()
    {
        return Err(ApiError::validation("title must not be empty"));
    }
    if let Some(description) = &update.description
        && description.trim().is_empty()
    {
        return Err(ApiError::validation("description must not be empty"));
    }

    let updated = state.posts.update(id, &update).await?;
    tracing::info!(post_id = %id, user_id = %user.id, "Post updated");
    Ok(Json(updated))
}

/// Handler for `DELETE /posts/{id}`.
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {id}")))?;

    require_ownership(user.id, post.user_id)?;

    state.posts.delete(id).await?;
    tracing::info!(post_id = %id, user_id = %user.id, "Post deleted");
    Ok(StatusCode::NO_CONTENT)
}
