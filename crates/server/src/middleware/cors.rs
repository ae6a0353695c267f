//! Cross-origin policy for the storefront SPA.
//!
//! An origin is allowed when it contains one of [`ALLOWED_ORIGIN_PARTS`]:
//! local development, Vercel preview deployments and the production domain.

use std::time::Duration;

use axum::http::{
    HeaderName, HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use eisenbalm_core::SITE_DOMAIN;

use super::auth::{ADMIN_PASSWORD_HEADER, API_KEY_HEADER};

/// Substrings that mark an origin as allowed.
pub const ALLOWED_ORIGIN_PARTS: [&str; 3] = ["localhost", "vercel.app", SITE_DOMAIN];

/// Build the CORS layer.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            origin.to_str().is_ok_and(is_allowed_origin)
        }))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(ADMIN_PASSWORD_HEADER),
            HeaderName::from_static(API_KEY_HEADER),
        ])
        .max_age(Duration::from_secs(60 * 60))
}

/// Whether a browser `Origin` may call the API.
#[must_use]
pub fn is_allowed_origin(origin: &str) -> bool {
    ALLOWED_ORIGIN_PARTS
        .iter()
        .any(|part| origin.contains(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_known_origins() {
        assert!(is_allowed_origin("http://localhost:3000"));
        assert!(is_allowed_origin("https://jesse-eisenbalm.vercel.app"));
        assert!(is_allowed_origin(
            "https://jesse-eisenbalm-kh0wbt3vd-camilleyeyous-projects.vercel.app"
        ));
        assert!(is_allowed_origin("https://jesseaeisenbalm.com"));
        assert!(is_allowed_origin("https://www.jesseaeisenbalm.com"));
    }

    #[test]
    fn test_rejects_other_origins() {
        assert!(!is_allowed_origin("https://evil.com"));
        assert!(!is_allowed_origin("http://127.0.0.1:3000"));
        assert!(!is_allowed_origin("null"));
        assert!(!is_allowed_origin(""));
    }
}
