//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use quill_core::ports::{
    Cache, CommentRepository, FollowRepository, GroupRepository, MediaStore, PostRepository,
    SessionService, UserRepository,
};
use quill_infra::cache::InMemoryCache;
use quill_infra::media::FsMediaStore;
use quill_infra::memory::MemoryStore;
use quill_infra::session::JwtSessionService;

#[cfg(feature = "postgres")]
use quill_infra::database::{
    DatabaseConfig, DatabaseConnections, PostgresCommentRepository, PostgresFollowRepository,
    PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;
use crate::render::{HtmlRenderer, PageRenderer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub cache: Arc<dyn Cache>,
    pub sessions: Arc<dyn SessionService>,
    pub media: Arc<dyn MediaStore>,
    pub renderer: Arc<dyn PageRenderer>,
    pub posts_per_page: u64,
    pub cache_ttl: Duration,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        if let Some(url) = &config.database_url {
            let db_config = DatabaseConfig {
                url: url.clone(),
                max_connections: config.db_max_connections,
                min_connections: config.db_min_connections,
            };
            match DatabaseConnections::init(&db_config).await {
                Ok(connections) => {
                    return Self::with_postgres(connections, config).await;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                }
            }
        }

        if config.database_url.is_none() {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }
        Self::with_memory(&MemoryStore::new(), config).await
    }

    #[cfg(feature = "postgres")]
    async fn with_postgres(connections: DatabaseConnections, config: &AppConfig) -> Self {
        // One pool handle shared by every repository.
        let db = Arc::new(connections.main);
        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            groups: Arc::new(PostgresGroupRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
            follows: Arc::new(PostgresFollowRepository::new(db)),
            cache: Self::cache().await,
            sessions: Arc::new(JwtSessionService::from_env()),
            media: Arc::new(FsMediaStore::new(config.media_root.clone())),
            renderer: Arc::new(HtmlRenderer),
            posts_per_page: config.posts_per_page,
            cache_ttl: config.cache_ttl,
        }
    }

    /// State over the in-memory store - the database-less fallback, also
    /// what the handler tests run against.
    pub async fn with_memory(store: &MemoryStore, config: &AppConfig) -> Self {
        Self {
            users: Arc::new(store.users()),
            groups: Arc::new(store.groups()),
            posts: Arc::new(store.posts()),
            comments: Arc::new(store.comments()),
            follows: Arc::new(store.follows()),
            cache: Self::cache().await,
            sessions: Arc::new(JwtSessionService::from_env()),
            media: Arc::new(FsMediaStore::new(config.media_root.clone())),
            renderer: Arc::new(HtmlRenderer),
            posts_per_page: config.posts_per_page,
            cache_ttl: config.cache_ttl,
        }
    }

    #[cfg(feature = "redis")]
    async fn cache() -> Arc<dyn Cache> {
        if std::env::var("REDIS_URL").is_ok() {
            match quill_infra::cache::RedisCache::from_env().await {
                Ok(cache) => return Arc::new(cache),
                Err(e) => {
                    tracing::error!("Failed to connect to Redis: {}. Using in-memory cache.", e);
                }
            }
        }
        Arc::new(InMemoryCache::new())
    }

    #[cfg(not(feature = "redis"))]
    async fn cache() -> Arc<dyn Cache> {
        Arc::new(InMemoryCache::new())
    }
}
