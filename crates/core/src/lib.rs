//! Eisenbalm Core - Shared domain logic.
//!
//! This crate provides the types and pure functions used across the
//! Jesse A. Eisenbalm components:
//! - `server` - Checkout, blog and admin HTTP API
//! - `cli` - Build-time sitemap generation and database migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Logic that the storefront SPA runs in the browser
//! (cart math, slug preview, the SEO checklist) lives here as well, so the
//! server and any client share one implementation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and prices
//! - [`catalog`] - The hard-coded product catalog
//! - [`cart`] - Cart state and totals
//! - [`checkout`] - Checkout request/response contract and redirect helpers
//! - [`post`] - Blog post records and projections
//! - [`slug`] - Slug generation and de-duplication
//! - [`seo`] - Advisory SEO checklist for draft posts
//! - [`sitemap`] - Sitemap XML assembly
//! - [`content`] - Static informational content (FAQ)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod post;
pub mod seo;
pub mod sitemap;
pub mod slug;
pub mod types;

pub use cart::{Cart, CartItem};
pub use catalog::Product;
pub use post::{AdminPostSummary, DEFAULT_AUTHOR, Post, PostSummary};
pub use types::*;

/// Public production domain of the storefront.
pub const SITE_DOMAIN: &str = "jesseaeisenbalm.com";

/// Canonical base URL of the storefront.
pub const SITE_URL: &str = "https://jesseaeisenbalm.com";
