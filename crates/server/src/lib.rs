//! Eisenbalm Server - Checkout, blog and admin API.
//!
//! Serves the storefront SPA on port 4242 by default.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Stripe Checkout (or a local mock gateway) for payments
//! - Supabase `PostgreSQL` for blog posts, Supabase Storage for images
//! - In-memory fallbacks for every backend, so the server runs with no
//!   credentials at all
//!
//! # Security
//!
//! There are no user accounts. The admin API is gated by a single shared
//! password and the publishing endpoint by an API key, both compared
//! against environment variables on every request.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod payments;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;

pub use config::ServerConfig;
pub use error::{AppError, Result};
pub use routes::router;
pub use state::AppState;
