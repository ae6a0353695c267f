//! Public blog routes and the API-key publishing endpoint.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde::Serialize;

use eisenbalm_core::post::CreatePost;
use eisenbalm_core::{Post, PostSummary};

use crate::error::{AppError, Result};
use crate::middleware::RequireApiKey;
use crate::services::blog;
use crate::state::AppState;

/// Build the public blog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/{slug}", get(get_post))
}

/// A list of posts.
#[derive(Debug, Serialize)]
pub struct PostsResponse<T> {
    pub posts: Vec<T>,
}

/// A single post.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub post: Post,
}

pub(crate) fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

/// Published posts, newest first.
async fn list_posts(State(state): State<AppState>) -> Result<Json<PostsResponse<PostSummary>>> {
    let posts = state.posts().list_published().await?;
    Ok(Json(PostsResponse { posts }))
}

/// A published post by slug. Drafts are reported as missing.
async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostResponse>> {
    let post = state
        .posts()
        .find_published(&slug)
        .await?
        .ok_or_else(post_not_found)?;
    Ok(Json(PostResponse { post }))
}

/// Create a post from the publishing integration.
async fn create_post(
    _: RequireApiKey,
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreatePost>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    insert_post(&state, payload).await
}

/// Validate and insert a post, shared by both create endpoints.
pub(crate) async fn insert_post(
    state: &AppState,
    payload: std::result::Result<Json<CreatePost>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    let Json(body) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let new_post = body.validate()?;

    let post = blog::create_post(state.posts(), new_post).await?;
    state.invalidate_sitemap();

    Ok((StatusCode::CREATED, Json(PostResponse { post })))
}
