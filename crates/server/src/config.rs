//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_PASSWORD` - Shared secret for the `x-admin-password` header
//! - `BLOG_API_KEY` - Shared secret for the `x-api-key` header on `POST /api/posts`
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 4242)
//! - `FRONTEND_URL` - Storefront base URL for checkout redirects (default: <https://jesseaeisenbalm.com>)
//! - `SERVER_PUBLIC_URL` - Public URL of this server, used for mock checkout links (default: <http://localhost:4242>)
//! - `STRIPE_SECRET_KEY` - Stripe secret key; without it checkout runs in mock mode
//! - `DATABASE_URL` - `PostgreSQL` connection string; without it posts live in memory
//! - `SUPABASE_URL` / `SUPABASE_SERVICE_KEY` - Supabase Storage credentials; without both uploads live in memory
//! - `SUPABASE_BUCKET` - Storage bucket for blog images (default: blog-images)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0..=1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0..=1.0 (default: 0.1)

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const DEFAULT_FRONTEND_URL: &str = "https://jesseaeisenbalm.com";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:4242";
const DEFAULT_BUCKET: &str = "blog-images";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Storefront base URL (success/cancel redirects, product images)
    pub frontend_url: String,
    /// Public URL of this server
    pub public_url: String,
    /// Stripe configuration; `None` selects the mock payment gateway
    pub stripe: Option<StripeConfig>,
    /// `PostgreSQL` connection URL; `None` selects the in-memory post store
    pub database_url: Option<SecretString>,
    /// Supabase Storage configuration; `None` selects the in-memory image store
    pub supabase: Option<SupabaseConfig>,
    /// Shared admin password
    pub admin_password: SecretString,
    /// API key for programmatic post creation
    pub blog_api_key: SecretString,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("frontend_url", &self.frontend_url)
            .field("public_url", &self.public_url)
            .field("stripe", &self.stripe)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("supabase", &self.supabase)
            .field("admin_password", &"[REDACTED]")
            .field("blog_api_key", &"[REDACTED]")
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish_non_exhaustive()
    }
}

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (`sk_live_...` / `sk_test_...`)
    pub secret_key: SecretString,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Supabase Storage configuration.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL (e.g., `https://abc.supabase.co`)
    pub url: String,
    /// Service role key
    pub service_key: SecretString,
    /// Bucket blog images are written to
    pub bucket: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("service_key", &"[REDACTED]")
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "4242")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        let frontend_url = get_url_or_default("FRONTEND_URL", DEFAULT_FRONTEND_URL)?;
        let public_url = get_url_or_default("SERVER_PUBLIC_URL", DEFAULT_PUBLIC_URL)?;

        let stripe = get_optional_env("STRIPE_SECRET_KEY").map(|key| StripeConfig {
            secret_key: SecretString::from(key),
        });
        let database_url = get_optional_env("DATABASE_URL").map(SecretString::from);
        let supabase = SupabaseConfig::from_env()?;

        let admin_password = get_required_secret("ADMIN_PASSWORD")?;
        let blog_api_key = get_required_secret("BLOG_API_KEY")?;

        Ok(Self {
            host,
            port,
            frontend_url,
            public_url,
            stripe,
            database_url,
            supabase,
            admin_password,
            blog_api_key,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Configuration with every optional backend disabled.
    ///
    /// Checkout runs in mock mode and posts and images are kept in memory.
    /// Used for local development and tests.
    #[must_use]
    pub fn local(admin_password: &str, blog_api_key: &str) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 4242,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            stripe: None,
            database_url: None,
            supabase: None,
            admin_password: SecretString::from(admin_password),
            blog_api_key: SecretString::from(blog_api_key),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether checkout runs against Stripe rather than the mock gateway.
    #[must_use]
    pub const fn is_live_payments(&self) -> bool {
        self.stripe.is_some()
    }
}

impl SupabaseConfig {
    /// Both `SUPABASE_URL` and `SUPABASE_SERVICE_KEY` must be set, or neither.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        match (
            get_optional_env("SUPABASE_URL"),
            get_optional_env("SUPABASE_SERVICE_KEY"),
        ) {
            (Some(url), Some(key)) => {
                validate_url("SUPABASE_URL", &url)?;
                Ok(Some(Self {
                    url: url.trim_end_matches('/').to_string(),
                    service_key: SecretString::from(key),
                    bucket: get_env_or_default("SUPABASE_BUCKET", DEFAULT_BUCKET),
                }))
            }
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "SUPABASE_SERVICE_KEY".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("SUPABASE_URL".to_string())),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a required, non-empty environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value =
        get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))?;
    let secret = SecretString::from(value);
    validate_shared_secret(&secret, key)?;
    Ok(secret)
}

/// Get a URL variable with a default, without its trailing slash.
fn get_url_or_default(key: &str, default: &str) -> Result<String, ConfigError> {
    let value = get_env_or_default(key, default);
    validate_url(key, &value)?;
    Ok(value.trim_end_matches('/').to_string())
}

fn validate_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(())
}

/// Parse a Sentry sample rate in `0.0..=1.0`.
fn get_sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Reject shared secrets that contain whitespace, which cannot survive an HTTP header round trip.
fn validate_shared_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    if secret.expose_secret().chars().any(char::is_whitespace) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            "must not contain whitespace".to_string(),
        ));
    }
    Ok(())
}
