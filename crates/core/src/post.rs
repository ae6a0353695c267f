//! Blog post records and their projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::slug;
use crate::types::PostId;

/// Author used when a post does not name one.
pub const DEFAULT_AUTHOR: &str = "Jesse A. Eisenbalm";

/// A stored blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    /// Unique across all posts, published or not.
    pub slug: String,
    pub excerpt: Option<String>,
    /// HTML body.
    pub content: String,
    pub author: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public listing projection of a published post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub author: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            cover_image: post.cover_image.clone(),
            tags: post.tags.clone(),
            created_at: post.created_at,
        }
    }
}

/// Admin listing projection, including drafts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPostSummary {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub author: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Post> for AdminPostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            cover_image: post.cover_image.clone(),
            tags: post.tags.clone(),
            published: post.published,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Slug and last-modified date of a published post, for the sitemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedSlug {
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PublishedSlug {
    /// When the post last changed, falling back to its creation time.
    #[must_use]
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

impl From<&Post> for PublishedSlug {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            created_at: post.created_at,
            updated_at: Some(post.updated_at),
        }
    }
}

/// Request body for creating a post.
///
/// Every field except `title` is optional; see [`CreatePost::validate`] for
/// the defaults applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePost {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

/// A validated post ready to be inserted, before its slug is made unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    /// Base slug; the store appends `-N` if it is taken.
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
}

/// Reasons a create request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostValidationError {
    #[error("Title is required")]
    MissingTitle,
}

/// Treat blank strings as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CreatePost {
    /// Validate the request and apply defaults.
    ///
    /// - `title` must be present and non-blank
    /// - `slug` is the trimmed explicit value, or derived from the title
    /// - `author` defaults to [`DEFAULT_AUTHOR`]
    /// - `published` defaults to `false`
    /// - blank tags are dropped
    ///
    /// # Errors
    ///
    /// Returns `PostValidationError::MissingTitle` if the title is missing or blank.
    pub fn validate(self) -> Result<NewPost, PostValidationError> {
        let title = non_blank(self.title).ok_or(PostValidationError::MissingTitle)?;

        let slug = non_blank(self.slug)
            .or_else(|| Some(slug::slugify(&title)).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| slug::FALLBACK_SLUG.to_string());

        let tags = self
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(NewPost {
            title,
            slug,
            excerpt: non_blank(self.excerpt),
            content: self.content.unwrap_or_default(),
            author: non_blank(self.author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            cover_image: non_blank(self.cover_image),
            tags,
            published: self.published.unwrap_or(false),
        })
    }
}

/// The editable fields of a draft, as seen by the SEO checklist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    /// HTML body.
    #[serde(default)]
    pub content: String,
}
