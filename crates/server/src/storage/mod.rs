//! Image storage for blog uploads.
//!
//! # Backends
//!
//! - [`SupabaseStorage`] - Supabase Storage bucket, used when
//!   `SUPABASE_URL` and `SUPABASE_SERVICE_KEY` are set
//! - [`MemoryImageStore`] - process-local, for development and tests
//!
//! Stored objects are never cleaned up; a post that stops referencing an
//! image leaves it in the bucket.

pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;

pub use memory::MemoryImageStore;
pub use supabase::SupabaseStorage;

/// Errors that can occur when storing an image.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The storage service rejected the upload.
    #[error("{message}")]
    Api {
        /// HTTP status returned by the service.
        status: u16,
        /// Service error message.
        message: String,
    },
}

/// Object storage for uploaded images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes` under `name` and return its public URL.
    async fn put(&self, name: &str, content_type: &str, bytes: Bytes)
    -> Result<String, StorageError>;
}
