//! In-memory post repository - used when no database is configured, and in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use posts_core::domain::{Post, PostId, Title};
use posts_core::error::RepoError;
use posts_core::ports::{Page, PageRequest, PostRepository};

#[derive(Default)]
struct Store {
    posts: BTreeMap<PostId, Post>,
    last_id: PostId,
}

/// In-memory post store using an ordered map behind an async RwLock.
///
/// Ids are handed out under the same write lock as the insert, so they are
/// unique and never reused, even after deletes.
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    store: RwLock<Store>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::default()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, title: Title) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;

        store.last_id += 1;
        let post = Post::new(store.last_id, title, Utc::now());
        store.posts.insert(post.id, post.clone());

        tracing::debug!(post_id = post.id, "Inserted post");
        Ok(post)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.posts.get(&id).cloned())
    }

    async fn update(&self, id: PostId, title: Title) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;

        let post = store.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.retitle(title, Utc::now());

        tracing::debug!(post_id = id, "Updated post");
        Ok(post.clone())
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let mut store = self.store.write().await;

        store.posts.remove(&id).ok_or(RepoError::NotFound)?;

        tracing::debug!(post_id = id, "Deleted post");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.posts.values().cloned().collect())
    }

    async fn paginate(&self, request: PageRequest) -> Result<Page<Post>, RepoError> {
        let store = self.store.read().await;

        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.per_page).unwrap_or(usize::MAX);

        Ok(Page {
            items: store.posts.values().skip(skip).take(take).cloned().collect(),
            page: request.page,
            per_page: request.per_page,
            total: store.posts.len() as u64,
        })
    }
}
