//! Post resource service - the lifecycle rules behind the `/api/posts` endpoints.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{Post, PostId};
use crate::error::{DomainError, RepoError};
use crate::ports::{Page, PostRepository};
use crate::validation::{validate_page, validate_title};

const ENTITY: &str = "Post";

/// Result of listing posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostListing {
    /// Every post, no pagination requested.
    All(Vec<Post>),
    /// A single requested page.
    Paged(Page<Post>),
}

/// CRUD operations over posts.
///
/// Callers are expected to have authenticated the request already; this
/// service only validates input and talks to the repository.
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// List posts, optionally one page at a time.
    pub async fn list(
        &self,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> Result<PostListing, DomainError> {
        match validate_page(page, per_page)? {
            None => Ok(PostListing::All(self.repo.list().await.map_err(internal)?)),
            Some(request) => Ok(PostListing::Paged(
                self.repo.paginate(request).await.map_err(internal)?,
            )),
        }
    }

    /// Validate `title` and persist a new post.
    pub async fn create(&self, title: Option<&Value>) -> Result<Post, DomainError> {
        let title = validate_title(title)?;
        self.repo.create(title).await.map_err(internal)
    }

    /// Fetch a single post.
    pub async fn show(&self, id: PostId) -> Result<Post, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or(DomainError::NotFound {
                entity_type: ENTITY,
                id,
            })
    }

    /// Replace the title of an existing post.
    ///
    /// The post is resolved before the body is validated, so an unknown id
    /// reports not-found even when the title is also invalid.
    pub async fn update(&self, id: PostId, title: Option<&Value>) -> Result<Post, DomainError> {
        self.show(id).await?;
        let title = validate_title(title)?;
        self.repo.update(id, title).await.map_err(not_found_or_internal(id))
    }

    /// Permanently remove a post.
    pub async fn delete(&self, id: PostId) -> Result<(), DomainError> {
        self.repo.delete(id).await.map_err(not_found_or_internal(id))
    }
}

fn internal(err: RepoError) -> DomainError {
    DomainError::Internal(err.to_string())
}

fn not_found_or_internal(id: PostId) -> impl Fn(RepoError) -> DomainError {
    move |err| match err {
        RepoError::NotFound => DomainError::NotFound {
            entity_type: ENTITY,
            id,
        },
        other => internal(other),
    }
}
