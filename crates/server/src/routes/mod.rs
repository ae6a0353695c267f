//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                           - Status message with payment mode
//! GET    /health                     - Liveness
//! GET    /health/ready               - Readiness (post store reachable)
//!
//! # Checkout
//! POST   /create-checkout-session    - Create a hosted checkout session
//! GET    /verify-session/{id}        - Payment status of a session
//! GET    /mock-checkout              - Test payment page (mock mode only)
//!
//! # Blog
//! GET    /api/posts                  - Published posts
//! GET    /api/posts/{slug}           - Published post by slug
//! POST   /api/posts                  - Create post (x-api-key)
//!
//! # Admin (x-admin-password)
//! POST   /api/admin/auth             - Check the password
//! GET    /api/admin/posts            - All posts, drafts included
//! POST   /api/admin/posts            - Create post
//! PATCH  /api/admin/posts/{id}       - Set published flag
//! DELETE /api/admin/posts/{id}       - Delete post
//! POST   /api/admin/upload           - Upload an image (multipart `file`)
//! POST   /api/admin/seo              - SEO checklist for a draft
//!
//! # Content
//! GET    /api/sitemap                - Sitemap XML
//! GET    /api/faq                    - FAQ entries
//! GET    /api/products               - Product catalog
//! ```

pub mod admin;
pub mod blog;
pub mod checkout;
pub mod health;
pub mod home;
pub mod sitemap;

use axum::{Router, middleware};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{cors_layer, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Build the application router with its middleware stack.
///
/// Sentry layers are added by the binary on top of this.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(home::router())
        .merge(health::router())
        .merge(checkout::router())
        .merge(blog::router())
        .merge(admin::router())
        .merge(sitemap::router())
        .layer(cors_layer())
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
