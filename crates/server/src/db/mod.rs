//! Blog post storage.
//!
//! # Table: `posts`
//!
//! One row per blog post, published or draft. `slug` carries a `UNIQUE`
//! constraint; inserting a taken slug surfaces as
//! [`RepositoryError::Conflict`] so the caller can pick the next free one.
//!
//! # Backends
//!
//! - [`PostRepository`] - `PostgreSQL` (Supabase), used when `DATABASE_URL` is set
//! - [`MemoryPostStore`] - process-local, for development and tests
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p eisenbalm-cli -- migrate
//! ```

pub mod memory;
pub mod posts;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use eisenbalm_core::post::{NewPost, PublishedSlug};
use eisenbalm_core::{AdminPostSummary, Post, PostId, PostSummary};

pub use memory::MemoryPostStore;
pub use posts::PostRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Constraint violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Storage operations the blog API needs.
///
/// Listings are ordered newest first by `created_at`.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Published posts for the public listing.
    async fn list_published(&self) -> Result<Vec<PostSummary>, RepositoryError>;

    /// A published post by slug. Drafts are reported as absent.
    async fn find_published(&self, slug: &str) -> Result<Option<Post>, RepositoryError>;

    /// Every post, drafts included.
    async fn list_all(&self) -> Result<Vec<AdminPostSummary>, RepositoryError>;

    /// Slugs in use that start with `prefix`.
    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>, RepositoryError>;

    /// Insert a post under exactly `post.slug`.
    ///
    /// Returns `RepositoryError::Conflict` if the slug is already taken.
    async fn insert(&self, post: &NewPost) -> Result<Post, RepositoryError>;

    /// Set the published flag and stamp `updated_at`.
    ///
    /// Returns `Ok(None)` if no post has this ID.
    async fn set_published(
        &self,
        id: PostId,
        published: bool,
    ) -> Result<Option<Post>, RepositoryError>;

    /// Delete a post. Returns whether a row was removed.
    async fn delete(&self, id: PostId) -> Result<bool, RepositoryError>;

    /// Slug and modification dates of published posts, for the sitemap.
    async fn published_slugs(&self) -> Result<Vec<PublishedSlug>, RepositoryError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
