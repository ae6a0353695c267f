//! Integration tests for the Eisenbalm server.
//!
//! Tests drive the full router in-process, with in-memory post and image
//! stores and the mock payment gateway, so they need no database, Stripe
//! account or running server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p eisenbalm-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `admin_auth` - Shared-secret gating of the admin and publishing APIs
//! - `blog` - Post lifecycle, slugs and publish state
//! - `uploads` - Image upload validation
//! - `checkout` - Session creation and verification
//! - `content` - Sitemap, FAQ, products and health

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use eisenbalm_server::db::MemoryPostStore;
use eisenbalm_server::payments::{MockGateway, PaymentGateway};
use eisenbalm_server::storage::MemoryImageStore;
use eisenbalm_server::{AppState, ServerConfig, router};

/// Admin password configured for every test app.
pub const ADMIN_PASSWORD: &str = "test-admin-password";

/// Blog API key configured for every test app.
pub const API_KEY: &str = "test-blog-api-key";

/// Multipart boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "eisenbalm-test-boundary";

/// A response captured from the router.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// The body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The server under test plus handles on its in-memory backends.
pub struct TestApp {
    pub router: Router,
    pub posts: Arc<MemoryPostStore>,
    pub images: Arc<MemoryImageStore>,
}

impl TestApp {
    /// App with the mock payment gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::with_payments(Arc::new(MockGateway::new("http://localhost:4242")))
    }

    /// App with a custom payment gateway.
    #[must_use]
    pub fn with_payments(payments: Arc<dyn PaymentGateway>) -> Self {
        let posts = Arc::new(MemoryPostStore::new());
        let images = Arc::new(MemoryImageStore::new("blog-images"));
        let mut config = ServerConfig::local(ADMIN_PASSWORD, API_KEY);
        config.frontend_url = "https://shop.test".to_string();

        let state = AppState::new(config, posts.clone(), payments, images.clone());

        Self {
            router: router(state),
            posts,
            images,
        }
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::unwrap_used)]
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET uri` with optional extra headers.
    pub async fn get(&self, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.send(request(Method::GET, uri, headers, Body::empty()))
            .await
    }

    /// Send a JSON body.
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> TestResponse {
        let mut all = vec![(header::CONTENT_TYPE.as_str(), "application/json")];
        all.extend_from_slice(headers);
        self.send(request(method, uri, &all, Body::from(body.to_string())))
            .await
    }

    /// Create a post through the admin API and return it.
    ///
    /// # Panics
    ///
    /// Panics if the post is not created.
    pub async fn create_post(&self, body: &Value) -> Value {
        let response = self
            .json(
                Method::POST,
                "/api/admin/posts",
                &[("x-admin-password", ADMIN_PASSWORD)],
                body,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()["post"].clone()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a request.
///
/// # Panics
///
/// Panics if a header name or value is invalid.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn request(method: Method, uri: &str, headers: &[(&str, &str)], body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(body).unwrap()
}

/// A multipart body with one file part.
#[must_use]
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// A multipart body with a single text field and no file.
#[must_use]
pub fn multipart_text(field: &str, value: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"\r\n\r\n\
         {value}\r\n--{BOUNDARY}--\r\n"
    )
    .into_bytes()
}

/// Content type header for [`multipart_body`].
#[must_use]
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
