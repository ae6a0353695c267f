//! Business logic services.
//!
//! # Services
//!
//! - `blog` - Post creation with slug de-duplication
//! - `upload` - Image upload validation and object naming

pub mod blog;
pub mod upload;
