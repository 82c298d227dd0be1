use async_trait::async_trait;

use crate::domain::{Post, PostId, Title};
use crate::error::RepoError;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Number of items preceding this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// One page of results plus the total across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl<T> Page<T> {
    /// Index of the last page; an empty collection still has page 1.
    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }
}

/// Post repository - persistence for the post resource.
///
/// Implementations assign ids, which must stay unique under concurrent
/// creates, and must make deletions visible to the very next read.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post and return it with its assigned id.
    async fn create(&self, title: Title) -> Result<Post, RepoError>;

    /// Find a post by its id.
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError>;

    /// Replace the title of an existing post, refreshing `updated_at`.
    ///
    /// Returns [`RepoError::NotFound`] if no post has this id.
    async fn update(&self, id: PostId, title: Title) -> Result<Post, RepoError>;

    /// Delete a post by its id.
    ///
    /// Returns [`RepoError::NotFound`] if no post has this id.
    async fn delete(&self, id: PostId) -> Result<(), RepoError>;

    /// All posts ordered by id.
    async fn list(&self) -> Result<Vec<Post>, RepoError>;

    /// One page of posts ordered by id.
    async fn paginate(&self, request: PageRequest) -> Result<Page<Post>, RepoError>;
}
