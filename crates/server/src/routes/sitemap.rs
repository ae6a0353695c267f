//! Sitemap route.

use axum::{
    Router,
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use eisenbalm_core::SITE_URL;
use eisenbalm_core::sitemap::build_sitemap;

use crate::error::Result;
use crate::state::AppState;

/// Build the sitemap router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/sitemap", get(sitemap))
}

/// Serve the sitemap XML.
///
/// The rendered document is cached for an hour; any post write drops it.
async fn sitemap(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let xml = if let Some(xml) = state.cached_sitemap().await {
        xml
    } else {
        let generation = state.sitemap_generation();
        let posts = state.posts().published_slugs().await?;
        let xml = build_sitemap(SITE_URL, &posts, Utc::now().date_naive());
        tracing::debug!(posts = posts.len(), "Sitemap rendered");
        state.cache_sitemap(generation, xml.clone()).await;
        xml
    };

    Ok((
        [
            (CONTENT_TYPE, "application/xml"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        xml,
    ))
}
