//! Build-time sitemap generation.
//!
//! Fetches `GET /api/sitemap` from a running server and writes the XML into
//! the SPA's static assets so crawlers get it without hitting the API.

use std::path::Path;
use std::time::Duration;

use eisenbalm_core::sitemap::count_locs;

/// Server queried when neither `--server-url` nor `SERVER_URL` is given.
pub const DEFAULT_SERVER_URL: &str = "https://jesse-eisenbalm-server.vercel.app";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from fetching or writing the sitemap.
#[derive(Debug, thiserror::Error)]
pub enum SitemapError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to write sitemap: {0}")]
    Io(#[from] std::io::Error),
}

/// Size and URL count of a sitemap document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SitemapStats {
    pub size_kb: f64,
    pub urls: usize,
}

impl SitemapStats {
    /// Measure `xml`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(xml: &str) -> Self {
        Self {
            size_kb: xml.len() as f64 / 1024.0,
            urls: count_locs(xml),
        }
    }
}

/// Sitemap endpoint for a server base URL.
#[must_use]
pub fn sitemap_url(server_url: &str) -> String {
    format!("{}/api/sitemap", server_url.trim_end_matches('/'))
}

/// Fetch the sitemap from `server_url` and write it to `output`.
///
/// # Errors
///
/// Returns `SitemapError` if the request fails, the server answers with a
/// non-success status, or the file cannot be written.
pub async fn generate(server_url: &str, output: &Path) -> Result<SitemapStats, SitemapError> {
    let url = sitemap_url(server_url);
    tracing::info!(%url, "Fetching sitemap from server...");

    let client = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(SitemapError::Status(response.status()));
    }
    let xml = response.text().await?;

    write_sitemap(output, &xml).await?;

    let stats = SitemapStats::of(&xml);
    tracing::info!(path = %output.display(), "Sitemap generated");
    tracing::info!("Size: {:.2} KB", stats.size_kb);
    tracing::info!("Total URLs: {}", stats.urls);
    Ok(stats)
}

/// Write `xml` to `output`, creating parent directories as needed.
///
/// # Errors
///
/// Returns any I/O error from creating directories or writing the file.
pub async fn write_sitemap(output: &Path, xml: &str) -> std::io::Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output, xml).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sitemap_url() {
        assert_eq!(
            sitemap_url("https://api.example.com/"),
            "https://api.example.com/api/sitemap"
        );
        assert_eq!(
            sitemap_url("http://localhost:4242"),
            "http://localhost:4242/api/sitemap"
        );
    }

    #[test]
    fn test_stats() {
        let xml = "<urlset><url><loc>a</loc></url><url><loc>b</loc></url></urlset>";
        let stats = SitemapStats::of(xml);
        assert_eq!(stats.urls, 2);
        assert!(stats.size_kb > 0.0 && stats.size_kb < 1.0);
    }

    #[tokio::test]
    async fn test_write_sitemap_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("eisenbalm-cli-{}", std::process::id()));
        let output = dir.join("public").join("sitemap.xml");

        write_sitemap(&output, "<urlset/>").await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&output).await.unwrap(), "<urlset/>");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let output = std::env::temp_dir().join("eisenbalm-cli-unreachable.xml");
        // Port 9 (discard) on localhost refuses connections in test environments.
        let result = generate("http://127.0.0.1:9", &output).await;
        assert!(result.is_err());
        assert!(!output.exists());
    }
}
