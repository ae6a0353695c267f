//! Integration tests for admin image uploads.
//!
//! Rejected uploads must never reach the image store.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, StatusCode};

use eisenbalm_integration_tests::{
    ADMIN_PASSWORD, TestApp, TestResponse, multipart_body, multipart_content_type,
    multipart_text, request,
};
use eisenbalm_server::services::upload::MAX_UPLOAD_BYTES;

async fn upload(app: &TestApp, body: Vec<u8>) -> TestResponse {
    let content_type = multipart_content_type();
    app.send(request(
        Method::POST,
        "/api/admin/upload",
        &[
            ("x-admin-password", ADMIN_PASSWORD),
            ("content-type", content_type.as_str()),
        ],
        Body::from(body),
    ))
    .await
}

#[tokio::test]
async fn test_image_upload_returns_public_url() {
    let app = TestApp::new();
    let response = upload(
        &app,
        multipart_body("file", "cover.PNG", "image/png", b"\x89PNG\r\n\x1a\n"),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    let url = response.json()["url"].as_str().unwrap().to_string();
    let name = url.strip_prefix("memory://blog-images/").unwrap();

    // <millis>-<random>.<ext>, and the original file name is not kept
    let (millis, rest) = name.split_once('-').unwrap();
    assert!(millis.parse::<i64>().is_ok());
    assert!(rest.ends_with(".png"));
    assert!(!name.contains("cover"));

    let stored = app.images.get(name).await.unwrap();
    assert_eq!(stored.content_type, "image/png");
    assert_eq!(stored.bytes.as_ref(), b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn test_each_upload_gets_a_fresh_name() {
    let app = TestApp::new();
    let first = upload(&app, multipart_body("file", "a.jpg", "image/jpeg", b"1")).await;
    let second = upload(&app, multipart_body("file", "a.jpg", "image/jpeg", b"2")).await;

    assert_ne!(first.json()["url"], second.json()["url"]);
    assert_eq!(app.images.len().await, 2);
}

#[tokio::test]
async fn test_non_image_is_rejected() {
    let app = TestApp::new();
    for (name, mime) in [("notes.txt", "text/plain"), ("doc.pdf", "application/pdf")] {
        let response = upload(&app, multipart_body("file", name, mime, b"hello")).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.json()["error"], "Only image files are allowed");
    }
    assert!(app.images.is_empty().await);
}

#[tokio::test]
async fn test_oversized_image_is_rejected() {
    let app = TestApp::new();
    let data = vec![0u8; MAX_UPLOAD_BYTES + 1];
    let response = upload(&app, multipart_body("file", "huge.png", "image/png", &data)).await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response.json()["error"].as_str().unwrap().contains("10MB"));
    assert!(app.images.is_empty().await);
}

#[tokio::test]
async fn test_image_far_over_body_limit_is_rejected() {
    let app = TestApp::new();
    let data = vec![0u8; MAX_UPLOAD_BYTES * 2];
    let response = upload(&app, multipart_body("file", "huge.png", "image/png", &data)).await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.images.is_empty().await);
}

#[tokio::test]
async fn test_image_at_limit_is_accepted() {
    let app = TestApp::new();
    let data = vec![0u8; MAX_UPLOAD_BYTES];
    let response = upload(&app, multipart_body("file", "max.png", "image/png", &data)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.images.len().await, 1);
}

#[tokio::test]
async fn test_missing_file_field_is_rejected() {
    let app = TestApp::new();

    let wrong_field = upload(&app, multipart_body("image", "a.png", "image/png", b"png")).await;
    assert_eq!(wrong_field.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_field.json()["error"], "No file uploaded");

    let text_only = upload(&app, multipart_text("caption", "hello")).await;
    assert_eq!(text_only.status, StatusCode::BAD_REQUEST);

    assert!(app.images.is_empty().await);
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected() {
    let app = TestApp::new();
    let response = app
        .send(request(
            Method::POST,
            "/api/admin/upload",
            &[
                ("x-admin-password", ADMIN_PASSWORD),
                ("content-type", "application/json"),
            ],
            Body::from("{}"),
        ))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.images.is_empty().await);
}
