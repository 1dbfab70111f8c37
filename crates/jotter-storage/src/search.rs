//! Search and pagination parameter types.

use serde::{Deserialize, Serialize};

use crate::post::PostStatus;

/// Default page size when the caller does not specify one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Hard upper bound on page size.
pub const MAX_PER_PAGE: u32 = 100;

/// Filters and pagination for listing posts.
///
/// All filters are conjunctive. Results are ordered newest-first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostQuery {
    /// Case-insensitive substring match over title and description.
    #[serde(default)]
    pub q: Option<String>,

    /// Exact tag membership.
    #[serde(default)]
    pub tag: Option<String>,

    /// Publication status filter.
    #[serde(default)]
    pub status: Option<PostStatus>,

    /// 1-based page number.
    #[serde(default)]
    pub page: Option<u32>,

    /// Page size, clamped to [`MAX_PER_PAGE`].
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl PostQuery {
    /// Returns the effective 1-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Returns the effective page size, clamped to the allowed range.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// Returns the row offset for the effective page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.per_page())
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    /// Page size used.
    pub per_page: u32,
    /// Total matching items across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Creates a page from its parts.
    #[must_use]
    pub fn new(items: Vec<T>, query: &PostQuery, total: u64) -> Self {
        Self {
            items,
            page: query.page(),
            per_page: query.per_page(),
            total,
        }
    }
}
