//! Application state shared across handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

use crate::config::ServerConfig;
use crate::db::{self, MemoryPostStore, PostRepository, PostStore};
use crate::payments::{MockGateway, PaymentError, PaymentGateway, StripeClient};
use crate::storage::{ImageStore, MemoryImageStore, StorageError, SupabaseStorage};

/// How long a rendered sitemap is served from memory.
const SITEMAP_TTL: Duration = Duration::from_secs(60 * 60);
const DEFAULT_BUCKET: &str = "blog-images";

/// Error building application state at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("payment client setup failed: {0}")]
    Payment(#[from] PaymentError),
    #[error("storage client setup failed: {0}")]
    Storage(#[from] StorageError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the post, payment and image backends.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    posts: Arc<dyn PostStore>,
    payments: Arc<dyn PaymentGateway>,
    images: Arc<dyn ImageStore>,
    sitemap: Cache<u64, String>,
    /// Bumped on every post write; the sitemap cache is keyed by it.
    sitemap_generation: AtomicU64,
}

impl AppState {
    /// Create application state from explicit backends.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        posts: Arc<dyn PostStore>,
        payments: Arc<dyn PaymentGateway>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        let sitemap = Cache::builder()
            .max_capacity(1)
            .time_to_live(SITEMAP_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                posts,
                payments,
                images,
                sitemap,
                sitemap_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Build the backends the configuration asks for.
    ///
    /// Missing Stripe, database or Supabase settings fall back to the mock
    /// gateway and the in-memory stores, with a warning for each.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the database is unreachable or an HTTP
    /// client cannot be built.
    pub async fn from_config(config: ServerConfig) -> Result<Self, StateError> {
        let posts: Arc<dyn PostStore> = match &config.database_url {
            Some(url) => {
                let pool = db::create_pool(url).await?;
                tracing::info!("Database pool created");
                Arc::new(PostRepository::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, blog posts are kept in memory");
                Arc::new(MemoryPostStore::new())
            }
        };

        let payments: Arc<dyn PaymentGateway> = match &config.stripe {
            Some(stripe) => Arc::new(StripeClient::new(stripe)?),
            None => {
                tracing::warn!("STRIPE_SECRET_KEY not set, checkout runs in mock mode");
                Arc::new(MockGateway::new(&config.public_url))
            }
        };

        let images: Arc<dyn ImageStore> = match &config.supabase {
            Some(supabase) => Arc::new(SupabaseStorage::new(supabase)?),
            None => {
                tracing::warn!("Supabase Storage not configured, uploads are kept in memory");
                Arc::new(MemoryImageStore::new(DEFAULT_BUCKET))
            }
        };

        Ok(Self::new(config, posts, payments, images))
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get the post store.
    #[must_use]
    pub fn posts(&self) -> &dyn PostStore {
        self.inner.posts.as_ref()
    }

    /// Get the payment gateway.
    #[must_use]
    pub fn payments(&self) -> &dyn PaymentGateway {
        self.inner.payments.as_ref()
    }

    /// Get the image store.
    #[must_use]
    pub fn images(&self) -> &dyn ImageStore {
        self.inner.images.as_ref()
    }

    /// Current sitemap generation. Read it before loading posts and pass it
    /// to [`Self::cache_sitemap`].
    #[must_use]
    pub fn sitemap_generation(&self) -> u64 {
        self.inner.sitemap_generation.load(Ordering::Acquire)
    }

    /// The cached sitemap, if one was rendered within the last hour and no
    /// post has changed since.
    pub async fn cached_sitemap(&self) -> Option<String> {
        self.inner.sitemap.get(&self.sitemap_generation()).await
    }

    /// Cache a sitemap rendered from posts read at `generation`.
    ///
    /// A render that raced a post write lands under a stale generation and
    /// is never served.
    pub async fn cache_sitemap(&self, generation: u64, xml: String) {
        self.inner.sitemap.insert(generation, xml).await;
    }

    /// Drop the cached sitemap after a post changes.
    pub fn invalidate_sitemap(&self) {
        self.inner.sitemap_generation.fetch_add(1, Ordering::AcqRel);
        self.inner.sitemap.invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(
            ServerConfig::local("admin", "key"),
            Arc::new(MemoryPostStore::new()),
            Arc::new(MockGateway::new("http://localhost:4242")),
            Arc::new(MemoryImageStore::new(DEFAULT_BUCKET)),
        )
    }

    #[tokio::test]
    async fn test_sitemap_cache_hit() {
        let state = state();
        let generation = state.sitemap_generation();
        state.cache_sitemap(generation, "<urlset/>".to_string()).await;
        assert_eq!(state.cached_sitemap().await.as_deref(), Some("<urlset/>"));
    }

    #[tokio::test]
    async fn test_invalidate_drops_cached_sitemap() {
        let state = state();
        state.cache_sitemap(state.sitemap_generation(), "<urlset/>".to_string()).await;
        state.invalidate_sitemap();
        assert!(state.cached_sitemap().await.is_none());
    }

    #[tokio::test]
    async fn test_render_started_before_write_is_never_served() {
        let state = state();
        let generation = state.sitemap_generation();
        state.invalidate_sitemap();
        state.cache_sitemap(generation, "<stale/>".to_string()).await;
        assert!(state.cached_sitemap().await.is_none());
    }
}
