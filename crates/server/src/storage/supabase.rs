//! Supabase Storage client.
//!
//! Uploads go to `POST {SUPABASE_URL}/storage/v1/object/{bucket}/{name}`
//! with the service key; the bucket is expected to be public, so the
//! returned URL is `{SUPABASE_URL}/storage/v1/object/public/{bucket}/{name}`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::{ImageStore, StorageError};
use crate::config::SupabaseConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Supabase Storage client for one bucket.
#[derive(Clone)]
pub struct SupabaseStorage {
    inner: Arc<SupabaseStorageInner>,
}

struct SupabaseStorageInner {
    client: reqwest::Client,
    url: String,
    bucket: String,
    service_key: SecretString,
}

impl SupabaseStorage {
    /// Create a new storage client.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Http` if the HTTP client cannot be built.
    pub fn new(config: &SupabaseConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(SupabaseStorageInner {
                client,
                url: config.url.trim_end_matches('/').to_string(),
                bucket: config.bucket.clone(),
                service_key: config.service_key.clone(),
            }),
        })
    }

    /// Upload endpoint for an object.
    fn object_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{name}",
            self.inner.url, self.inner.bucket
        )
    }

    /// Public URL of an object in the bucket.
    #[must_use]
    pub fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{name}",
            self.inner.url, self.inner.bucket
        )
    }
}

#[async_trait]
impl ImageStore for SupabaseStorage {
    #[instrument(skip(self, bytes), fields(bucket = %self.inner.bucket, size = bytes.len()))]
    async fn put(
        &self,
        name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        let key = self.inner.service_key.expose_secret();
        let response = self
            .inner
            .client
            .post(self.object_url(name))
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .header("apikey", key)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StorageErrorResponse>(&body)
                .ok()
                .and_then(StorageErrorResponse::into_message)
                .unwrap_or_else(|| format!("Storage upload failed with status {status}"));

            tracing::warn!(status = status.as_u16(), %message, "Supabase Storage error");
            return Err(StorageError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!(object = %name, "Image uploaded");
        Ok(self.public_url(name))
    }
}

/// Error body returned by Supabase Storage.
#[derive(Debug, Deserialize)]
struct StorageErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl StorageErrorResponse {
    fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}
