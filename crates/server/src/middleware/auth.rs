//! Shared-secret extractors for the admin and blog APIs.
//!
//! There are no sessions: every admin request carries the password in
//! `x-admin-password`, and the publishing integration carries its key in
//! `x-api-key`. A missing header is treated exactly like a wrong one.

use axum::{extract::FromRequestParts, http::request::Parts};
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the admin password.
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Header carrying the blog API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extractor that requires the admin password.
///
/// Place it first in the handler's arguments so an unauthenticated request
/// is rejected before its path or body is looked at.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_posts(_: RequireAdmin, State(state): State<AppState>) -> Result<Json<Value>> {
///     // ...
/// }
/// ```
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let expected = state.config().admin_password.expose_secret();
        if header_matches(parts, ADMIN_PASSWORD_HEADER, expected) {
            Ok(Self)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Rejected admin request");
            Err(AppError::Unauthorized)
        }
    }
}

/// Extractor that requires the blog API key.
pub struct RequireApiKey;

impl FromRequestParts<AppState> for RequireApiKey {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let expected = state.config().blog_api_key.expose_secret();
        if header_matches(parts, API_KEY_HEADER, expected) {
            Ok(Self)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Rejected API key");
            Err(AppError::Unauthorized)
        }
    }
}

fn header_matches(parts: &Parts, name: &str, expected: &str) -> bool {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|provided| secrets_match(provided.as_bytes(), expected.as_bytes()))
}

/// Compare two secrets without returning early on the first differing byte.
fn secrets_match(provided: &[u8], expected: &[u8]) -> bool {
    if expected.is_empty() || provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;

    use super::*;
    use crate::config::ServerConfig;
    use crate::db::MemoryPostStore;
    use crate::payments::MockGateway;
    use crate::storage::MemoryImageStore;

    fn state() -> AppState {
        AppState::new(
            ServerConfig::local("admin-pw", "blog-key"),
            Arc::new(MemoryPostStore::new()),
            Arc::new(MockGateway::new("http://localhost:4242")),
            Arc::new(MemoryImageStore::new("blog-images")),
        )
    }

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/admin/posts");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match(b"abc", b"abc"));
        assert!(!secrets_match(b"abd", b"abc"));
        assert!(!secrets_match(b"ab", b"abc"));
        assert!(!secrets_match(b"", b""));
    }

    #[tokio::test]
    async fn test_require_admin() {
        let state = state();

        let mut ok = parts(&[(ADMIN_PASSWORD_HEADER, "admin-pw")]);
        assert!(RequireAdmin::from_request_parts(&mut ok, &state).await.is_ok());

        let mut wrong = parts(&[(ADMIN_PASSWORD_HEADER, "nope")]);
        assert!(matches!(
            RequireAdmin::from_request_parts(&mut wrong, &state).await,
            Err(AppError::Unauthorized)
        ));

        let mut missing = parts(&[]);
        assert!(RequireAdmin::from_request_parts(&mut missing, &state).await.is_err());

        // The API key does not open the admin API.
        let mut other = parts(&[(ADMIN_PASSWORD_HEADER, "blog-key")]);
        assert!(RequireAdmin::from_request_parts(&mut other, &state).await.is_err());
    }

    #[tokio::test]
    async fn test_require_api_key() {
        let state = state();

        let mut ok = parts(&[(API_KEY_HEADER, "blog-key")]);
        assert!(RequireApiKey::from_request_parts(&mut ok, &state).await.is_ok());

        let mut admin = parts(&[(API_KEY_HEADER, "admin-pw")]);
        assert!(RequireApiKey::from_request_parts(&mut admin, &state).await.is_err());
    }
}
