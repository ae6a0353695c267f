//! In-memory post store.
//!
//! Used when no `DATABASE_URL` is configured and by the test suites. Holds
//! the same uniqueness guarantee on slugs as the `posts` table.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use eisenbalm_core::post::{NewPost, PublishedSlug};
use eisenbalm_core::{AdminPostSummary, Post, PostId, PostSummary};

use super::{PostStore, RepositoryError};

/// Process-local post store.
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    posts: RwLock<Vec<Post>>,
}

impl MemoryPostStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `posts`.
    #[must_use]
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: RwLock::new(posts),
        }
    }

    /// Number of stored posts, drafts included.
    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    /// Whether the store holds no posts.
    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

/// Posts sorted newest first. Equal timestamps keep reverse insertion order.
fn newest_first<'a>(posts: impl DoubleEndedIterator<Item = &'a Post>) -> Vec<&'a Post> {
    let mut sorted: Vec<&Post> = posts.rev().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn list_published(&self) -> Result<Vec<PostSummary>, RepositoryError> {
        let posts = self.posts.read().await;
        Ok(newest_first(posts.iter().filter(|p| p.published))
            .into_iter()
            .map(PostSummary::from)
            .collect())
    }

    async fn find_published(&self, slug: &str) -> Result<Option<Post>, RepositoryError> {
        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .find(|p| p.published && p.slug == slug)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<AdminPostSummary>, RepositoryError> {
        let posts = self.posts.read().await;
        Ok(newest_first(posts.iter())
            .into_iter()
            .map(AdminPostSummary::from)
            .collect())
    }

    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>, RepositoryError> {
        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .filter(|p| p.slug.starts_with(prefix))
            .map(|p| p.slug.clone())
            .collect())
    }

    async fn insert(&self, post: &NewPost) -> Result<Post, RepositoryError> {
        let mut posts = self.posts.write().await;
        if posts.iter().any(|p| p.slug == post.slug) {
            return Err(RepositoryError::Conflict(format!(
                "slug '{}' already exists",
                post.slug
            )));
        }

        let now = Utc::now();
        let stored = Post {
            id: PostId::generate(),
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            author: post.author.clone(),
            cover_image: post.cover_image.clone(),
            tags: post.tags.clone(),
            published: post.published,
            created_at: now,
            updated_at: now,
        };
        posts.push(stored.clone());
        Ok(stored)
    }

    async fn set_published(
        &self,
        id: PostId,
        published: bool,
    ) -> Result<Option<Post>, RepositoryError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        post.published = published;
        post.updated_at = Utc::now().max(post.updated_at);
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: PostId) -> Result<bool, RepositoryError> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }

    async fn published_slugs(&self) -> Result<Vec<PublishedSlug>, RepositoryError> {
        let posts = self.posts.read().await;
        Ok(newest_first(posts.iter().filter(|p| p.published))
            .into_iter()
            .map(PublishedSlug::from)
            .collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
