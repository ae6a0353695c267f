//! Admin API handlers.
//!
//! Every route here requires the `x-admin-password` header; see
//! [`RequireAdmin`].

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use eisenbalm_core::post::{CreatePost, PostDraft};
use eisenbalm_core::seo::{self, SeoReport};
use eisenbalm_core::{AdminPostSummary, PostId, SITE_DOMAIN};

use super::blog::{PostResponse, PostsResponse, insert_post, post_not_found};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::upload::{self, ImageUpload, UPLOAD_BODY_LIMIT};
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/auth", post(check_password))
        .route("/api/admin/posts", get(list_posts).post(create_post))
        .route(
            "/api/admin/posts/{id}",
            patch(set_published).delete(delete_post),
        )
        .route(
            "/api/admin/upload",
            post(upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/admin/seo", post(analyze_seo))
}

/// Response for `POST /api/admin/auth`.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub ok: bool,
}

/// Response for `DELETE /api/admin/posts/{id}`.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Response for `POST /api/admin/upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Body of `POST /api/admin/seo`.
#[derive(Debug, Deserialize)]
pub struct SeoRequest {
    #[serde(default)]
    pub draft: PostDraft,
    #[serde(default)]
    pub keyphrase: String,
}

/// Confirm the admin password. The extractor does the work.
async fn check_password(_: RequireAdmin) -> Json<AuthResponse> {
    Json(AuthResponse { ok: true })
}

/// Every post, drafts included, newest first.
async fn list_posts(
    _: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<PostsResponse<AdminPostSummary>>> {
    let posts = state.posts().list_all().await?;
    Ok(Json(PostsResponse { posts }))
}

async fn create_post(
    _: RequireAdmin,
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreatePost>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    insert_post(&state, payload).await
}

/// Toggle the published flag.
///
/// The body must carry a boolean `published`; anything else is a 400.
async fn set_published(
    _: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<PostResponse>> {
    let published = payload
        .ok()
        .and_then(|Json(body)| body.get("published").and_then(Value::as_bool))
        .ok_or_else(|| AppError::BadRequest("published must be a boolean".to_string()))?;

    let id: PostId = id.parse().map_err(|_| post_not_found())?;
    let post = state
        .posts()
        .set_published(id, published)
        .await?
        .ok_or_else(post_not_found)?;

    state.invalidate_sitemap();
    tracing::info!(post_id = %post.id, published, "Post publish state changed");

    Ok(Json(PostResponse { post }))
}

/// Delete a post permanently. Unknown IDs succeed too.
async fn delete_post(
    _: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if let Ok(id) = id.parse::<PostId>()
        && state.posts().delete(id).await?
    {
        state.invalidate_sitemap();
        tracing::info!(post_id = %id, "Post deleted");
    }

    Ok(Json(DeleteResponse { success: true }))
}

/// Store an uploaded image and return its public URL.
///
/// # Errors
///
/// Returns 400 if the `file` field is missing or not an image, and 413 if
/// it exceeds the upload limit.
async fn upload_image(
    _: RequireAdmin,
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart =
        multipart.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        if !content_type.as_deref().is_some_and(upload::is_image) {
            return Err(AppError::BadRequest(
                "Only image files are allowed".to_string(),
            ));
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        let image = ImageUpload::new(file_name.as_deref(), content_type.as_deref(), bytes)?;

        let url = state
            .images()
            .put(&image.object_name, &image.content_type, image.bytes)
            .await?;
        tracing::info!(object = %image.object_name, "Image uploaded");

        return Ok(Json(UploadResponse { url }));
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        upload::too_large()
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Run the SEO checklist over a draft.
async fn analyze_seo(
    _: RequireAdmin,
    payload: std::result::Result<Json<SeoRequest>, JsonRejection>,
) -> Result<Json<SeoReport>> {
    let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    Ok(Json(seo::analyze(
        &request.draft,
        &request.keyphrase,
        SITE_DOMAIN,
    )))
}
