//! Application state - shared across all handlers.

use std::sync::Arc;

use posts_core::PostService;
use posts_core::ports::{PostRepository, TokenService};
use posts_infra::{InMemoryPostRepository, JwtTokenService};

#[cfg(feature = "postgres")]
use posts_infra::PostgresPostRepository;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub tokens: Arc<dyn TokenService>,
    /// Backend serving posts, reported by the health check.
    pub storage: Storage,
}

/// Post store backing the running server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Memory,
    Postgres,
}

impl Storage {
    pub fn as_str(self) -> &'static str {
        match self {
            Storage::Memory => "memory",
            Storage::Postgres => "postgres",
        }
    }
}

impl AppState {
    /// State over the in-memory store.
    pub fn in_memory(repo: Arc<InMemoryPostRepository>, tokens: Arc<dyn TokenService>) -> Self {
        Self::new(repo, tokens, Storage::Memory)
    }

    pub fn new(
        repo: Arc<dyn PostRepository>,
        tokens: Arc<dyn TokenService>,
        storage: Storage,
    ) -> Self {
        Self {
            posts: Arc::new(PostService::new(repo)),
            tokens,
            storage,
        }
    }

    /// Build the application state with appropriate implementations.
    pub async fn from_config(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let (repo, storage) = Self::post_repository(config).await;

        tracing::info!(
            guard = %tokens.guard(),
            storage = storage.as_str(),
            "Application state initialized"
        );

        Self::new(repo, tokens, storage)
    }

    #[cfg(feature = "postgres")]
    async fn post_repository(config: &AppConfig) -> (Arc<dyn PostRepository>, Storage) {
        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return in_memory_store();
        };

        match posts_infra::database::connect(db_config).await {
            Ok(conn) => {
                let repo: Arc<dyn PostRepository> = Arc::new(PostgresPostRepository::new(conn));
                (repo, Storage::Postgres)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                in_memory_store()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn post_repository(config: &AppConfig) -> (Arc<dyn PostRepository>, Storage) {
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL ignored: built without postgres feature.");
        }
        tracing::info!("Running without postgres feature - using in-memory repository");
        in_memory_store()
    }
}

fn in_memory_store() -> (Arc<dyn PostRepository>, Storage) {
    let repo: Arc<dyn PostRepository> = Arc::new(InMemoryPostRepository::new());
    (repo, Storage::Memory)
}
