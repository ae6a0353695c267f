//! Hosted checkout providers.
//!
//! # Gateways
//!
//! - [`StripeClient`] - Stripe Checkout over the REST API, used when
//!   `STRIPE_SECRET_KEY` is set
//! - [`MockGateway`] - local test payments, no network
//!
//! Both create a session for a validated cart and later report whether it
//! was paid. Nothing is retried; provider errors go straight back to the
//! client.

pub mod mock;
pub mod stripe;

use async_trait::async_trait;
use thiserror::Error;

use eisenbalm_core::checkout::{self, CheckoutItem, SessionVerification};

pub use mock::MockGateway;
pub use stripe::StripeClient;

/// Errors that can occur when talking to a payment provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request. `message` is the provider's own text.
    #[error("{message}")]
    Api {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider error message.
        message: String,
    },

    /// Failed to parse the provider response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Which gateway is serving checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    Stripe,
    Mock,
}

impl PaymentMode {
    /// Human-readable name, shown on `GET /`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stripe => "Stripe",
            Self::Mock => "Mock",
        }
    }
}

/// A validated checkout request.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// Cart lines, already checked by [`checkout::validate_items`].
    pub items: Vec<CheckoutItem>,
    /// Storefront base URL, without a trailing slash.
    pub frontend_url: String,
}

impl SessionRequest {
    /// Validate `items` and build a request against `frontend_url`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if the cart is empty or a line is invalid.
    pub fn new(
        items: Vec<CheckoutItem>,
        frontend_url: &str,
    ) -> Result<Self, checkout::CheckoutError> {
        checkout::validate_items(&items)?;
        Ok(Self {
            items,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL the provider sends the customer to after paying.
    #[must_use]
    pub fn success_url(&self) -> String {
        checkout::success_url(&self.frontend_url)
    }

    /// URL the provider sends the customer to when they back out.
    #[must_use]
    pub fn cancel_url(&self) -> String {
        checkout::cancel_url(&self.frontend_url)
    }
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Provider session ID.
    pub id: String,
    /// Hosted payment page.
    pub url: String,
}

/// A hosted checkout provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Which gateway this is.
    fn mode(&self) -> PaymentMode;

    /// Create a checkout session for the request.
    async fn create_session(&self, request: &SessionRequest)
    -> Result<CheckoutSession, PaymentError>;

    /// Look up a session and report its payment status.
    async fn verify_session(&self, session_id: &str) -> Result<SessionVerification, PaymentError>;
}

/// Whether `id` looks like a session ID any gateway could have issued.
///
/// Session IDs are embedded in provider URLs, so anything outside
/// `[A-Za-z0-9_]` is refused up front.
#[must_use]
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 255 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
