//! `PostgreSQL` post repository.
//!
//! Queries are checked at runtime (`query_as` + `FromRow`) so the crate
//! builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use eisenbalm_core::post::{NewPost, PublishedSlug};
use eisenbalm_core::{AdminPostSummary, Post, PostId, PostSummary};

use super::{PostStore, RepositoryError};

/// Full `posts` row.
#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    slug: String,
    excerpt: Option<String>,
    content: String,
    author: String,
    cover_image: Option<String>,
    tags: Vec<String>,
    published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(r: PostRow) -> Self {
        Self {
            id: PostId::new(r.id),
            title: r.title,
            slug: r.slug,
            excerpt: r.excerpt,
            content: r.content,
            author: r.author,
            cover_image: r.cover_image,
            tags: r.tags,
            published: r.published,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Row for listings, without the HTML body.
#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    title: String,
    slug: String,
    excerpt: Option<String>,
    author: String,
    cover_image: Option<String>,
    tags: Vec<String>,
    published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SummaryRow> for PostSummary {
    fn from(r: SummaryRow) -> Self {
        Self {
            id: PostId::new(r.id),
            title: r.title,
            slug: r.slug,
            excerpt: r.excerpt,
            author: r.author,
            cover_image: r.cover_image,
            tags: r.tags,
            created_at: r.created_at,
        }
    }
}

impl From<SummaryRow> for AdminPostSummary {
    fn from(r: SummaryRow) -> Self {
        Self {
            id: PostId::new(r.id),
            title: r.title,
            slug: r.slug,
            excerpt: r.excerpt,
            author: r.author,
            cover_image: r.cover_image,
            tags: r.tags,
            published: r.published,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SlugRow {
    slug: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

/// Escape `LIKE` wildcards so `prefix` matches literally.
fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Repository for blog posts in `PostgreSQL`.
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PostRepository {
    #[instrument(skip(self))]
    async fn list_published(&self) -> Result<Vec<PostSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r"
            SELECT id, title, slug, excerpt, author, cover_image, tags, published,
                   created_at, updated_at
            FROM posts
            WHERE published
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostSummary::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_published(&self, slug: &str) -> Result<Option<Post>, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(
            r"
            SELECT id, title, slug, excerpt, content, author, cover_image, tags, published,
                   created_at, updated_at
            FROM posts
            WHERE slug = $1 AND published
            ",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<AdminPostSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r"
            SELECT id, title, slug, excerpt, author, cover_image, tags, published,
                   created_at, updated_at
            FROM posts
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AdminPostSummary::from).collect())
    }

    #[instrument(skip(self))]
    async fn slugs_with_prefix(&self, prefix: &str) -> Result<Vec<String>, RepositoryError> {
        let pattern = format!("{}%", escape_like(prefix));
        let slugs = sqlx::query_scalar::<_, String>("SELECT slug FROM posts WHERE slug LIKE $1")
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        Ok(slugs)
    }

    #[instrument(skip(self, post), fields(slug = %post.slug))]
    async fn insert(&self, post: &NewPost) -> Result<Post, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(
            r"
            INSERT INTO posts (title, slug, excerpt, content, author, cover_image, tags, published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, slug, excerpt, content, author, cover_image, tags, published,
                      created_at, updated_at
            ",
        )
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(&post.author)
        .bind(&post.cover_image)
        .bind(&post.tags)
        .bind(post.published)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("slug '{}' already exists", post.slug));
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn set_published(
        &self,
        id: PostId,
        published: bool,
    ) -> Result<Option<Post>, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(
            r"
            UPDATE posts
            SET published = $2, updated_at = GREATEST(NOW(), updated_at)
            WHERE id = $1
            RETURNING id, title, slug, excerpt, content, author, cover_image, tags, published,
                      created_at, updated_at
            ",
        )
        .bind(id.as_uuid())
        .bind(published)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: PostId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn published_slugs(&self) -> Result<Vec<PublishedSlug>, RepositoryError> {
        let rows = sqlx::query_as::<_, SlugRow>(
            r"
            SELECT slug, created_at, updated_at
            FROM posts
            WHERE published
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PublishedSlug {
                slug: r.slug,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
