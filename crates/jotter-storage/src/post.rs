//! Post domain model.
//!
//! A post is a short piece of user-authored content with a title, a body,
//! free-form tags, and a publication status. The owner reference
//! (`user_id`) is set at creation and never changes; every mutation must be
//! authorized against it before reaching storage.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Publication status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Not yet published; visible only through direct reads.
    #[default]
    Draft,
    /// Published and listed.
    Published,
    /// Retired from listings but retained.
    Archived,
}

impl PostStatus {
    /// Returns the status as its wire/database string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    /// Parses a status from its database string.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier.
    pub id: Uuid,

    /// Owner reference, immutable after creation.
    pub user_id: Uuid,

    /// Post title.
    pub title: String,

    /// Post body.
    pub description: String,

    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Publication status.
    #[serde(default)]
    pub status: PostStatus,

    /// When the post was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the post was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Owner of the new post.
    pub user_id: Uuid,
    /// Post title.
    pub title: String,
    /// Post body.
    pub description: String,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Initial status (defaults to draft).
    pub status: PostStatus,
}

impl NewPost {
    /// Creates a new post input with the required fields.
    #[must_use]
    pub fn new(user_id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            user_id,
            title: title.into(),
            description: description.into(),
            tags: Vec::new(),
            status: PostStatus::default(),
        }
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }
}

/// A partial update to a post.
///
/// `None` fields are left unchanged. The owner reference cannot be updated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostUpdate {
    /// New title, if changing.
    #[serde(default)]
    pub title: Option<String>,
    /// New body, if changing.
    #[serde(default)]
    pub description: Option<String>,
    /// New tag set, if changing.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// New status, if changing.
    #[serde(default)]
    pub status: Option<PostStatus>,
}

impl PostUpdate {
    /// Returns `true` if the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.status.is_none()
    }

    /// Applies this update to a post in place.
    pub fn apply(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(description) = &self.description {
            post.description = description.clone();
        }
        if let Some(tags) = &self.tags {
            post.tags = tags.clone();
        }
        if let Some(status) = self.status {
            post.status = status;
        }
    }
}

/// A post joined with its author's public identity.
#[derive(Debug, Clone, Serialize)]
pub struct PostWithAuthor {
    /// The post itself.
    #[serde(flatten)]
    pub post: Post,
    /// Author display name.
    pub author_name: String,
    /// Author email.
    pub author_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post(owner: Uuid) -> Post {
        let now = OffsetDateTime::now_utc();
        Post {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "First".to_string(),
            description: "Body".to_string(),
            tags: vec!["intro".to_string()],
            status: PostStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in [PostStatus::Draft, PostStatus::Published, PostStatus::Archived] {
            assert_eq!(PostStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PostStatus::parse("deleted"), None);
    }

    #[test]
    fn test_new_post_builder() {
        let owner = Uuid::new_v4();
        let post = NewPost::new(owner, "Title", "Description")
            .with_tags(vec!["a", "b"])
            .with_status(PostStatus::Published);

        assert_eq!(post.user_id, owner);
        assert_eq!(post.tags, vec!["a", "b"]);
        assert_eq!(post.status, PostStatus::Published);
    }

    #[test]
    fn test_update_apply_partial() {
        let mut post = sample_post(Uuid::new_v4());
        let owner = post.user_id;

        let update = PostUpdate {
            title: Some("Renamed".to_string()),
            status: Some(PostStatus::Published),
            ..PostUpdate::default()
        };
        assert!(!update.is_empty());
        update.apply(&mut post);

        assert_eq!(post.title, "Renamed");
        assert_eq!(post.description, "Body");
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.user_id, owner);
    }

    #[test]
    fn test_empty_update() {
        let update = PostUpdate::default();
        assert!(update.is_empty());

        let mut post = sample_post(Uuid::new_v4());
        let before = post.clone();
        update.apply(&mut post);
        assert_eq!(post.title, before.title);
        assert_eq!(post.tags, before.tags);
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&PostStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
        let parsed: PostStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(parsed, PostStatus::Archived);
    }
}
