//! Post creation.
//!
//! Slugs are unique across all posts. The free slug is computed from the
//! slugs already in use, then the insert is attempted; if another writer
//! took the same slug in between, the unique constraint rejects the insert
//! and the next free slug is tried.

use tracing::instrument;

use eisenbalm_core::Post;
use eisenbalm_core::post::NewPost;
use eisenbalm_core::slug::next_available_slug;

use crate::db::{PostStore, RepositoryError};

/// Insert attempts before giving up on finding a free slug.
pub const MAX_SLUG_ATTEMPTS: usize = 5;

/// Insert `post`, appending the smallest free `-N` suffix to its slug when needed.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if every attempt lost a race for the
/// slug, or any other store error unchanged.
#[instrument(skip(store, post), fields(base_slug = %post.slug))]
pub async fn create_post(store: &dyn PostStore, post: NewPost) -> Result<Post, RepositoryError> {
    let base = post.slug.clone();
    let mut candidate = post;

    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        let taken = store.slugs_with_prefix(&base).await?;
        candidate.slug = next_available_slug(&base, taken.iter().map(String::as_str));

        match store.insert(&candidate).await {
            Ok(created) => {
                tracing::info!(post_id = %created.id, slug = %created.slug, "Post created");
                return Ok(created);
            }
            Err(RepositoryError::Conflict(reason)) => {
                tracing::warn!(attempt, slug = %candidate.slug, %reason, "Slug taken, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(RepositoryError::Conflict(format!(
        "no free slug for '{base}' after {MAX_SLUG_ATTEMPTS} attempts"
    )))
}
