//! HTTP middleware stack for the server.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction), added in `main`
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. CORS
//!
//! Shared-secret checks are extractors rather than layers, so each handler
//! states which secret it needs.

pub mod auth;
pub mod cors;
pub mod request_id;
pub mod security_headers;

pub use auth::{ADMIN_PASSWORD_HEADER, API_KEY_HEADER, RequireAdmin, RequireApiKey};
pub use cors::cors_layer;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
