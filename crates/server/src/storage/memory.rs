//! In-memory image store.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::RwLock;

use super::{ImageStore, StorageError};

/// A stored object.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub content_type: String,
    pub bytes: Bytes,
}

/// Process-local image store.
///
/// Objects are addressed as `memory://{bucket}/{name}`; nothing serves them
/// over HTTP.
#[derive(Debug)]
pub struct MemoryImageStore {
    bucket: String,
    objects: RwLock<HashMap<String, StoredImage>>,
}

impl MemoryImageStore {
    /// Create an empty store for `bucket`.
    #[must_use]
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a stored object by name.
    pub async fn get(&self, name: &str) -> Option<StoredImage> {
        self.objects.read().await.get(name).cloned()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn put(
        &self,
        name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        self.objects.write().await.insert(
            name.to_string(),
            StoredImage {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(format!("memory://{}/{name}", self.bucket))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryImageStore::new("blog-images");
        assert!(store.is_empty().await);

        let url = store
            .put("a.png", "image/png", Bytes::from_static(b"\x89PNG"))
            .await
            .unwrap();

        assert_eq!(url, "memory://blog-images/a.png");
        let stored = store.get("a.png").await.unwrap();
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(stored.bytes.as_ref(), b"\x89PNG");
        assert_eq!(store.len().await, 1);
    }
}
