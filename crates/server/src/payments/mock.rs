//! Mock payment gateway for running without Stripe credentials.
//!
//! Sessions point at the server's own `/mock-checkout` page, which links
//! straight to the storefront success page. Every session verifies as paid.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use moka::future::Cache;
use rust_decimal::Decimal;

use eisenbalm_core::checkout::{self, PAID_STATUS, SessionVerification};
use eisenbalm_core::types::price;

use super::{CheckoutSession, PaymentError, PaymentGateway, PaymentMode, SessionRequest};

/// Prefix of every mock session ID.
pub const MOCK_SESSION_PREFIX: &str = "mock_session_";

/// Customer email reported for every mock payment.
pub const MOCK_CUSTOMER_EMAIL: &str = "test@example.com";

/// How long a session's total is remembered for verification.
const SESSION_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_SESSIONS: u64 = 10_000;

/// Gateway that accepts every checkout without contacting a provider.
#[derive(Debug)]
pub struct MockGateway {
    public_url: String,
    totals: Cache<String, i64>,
}

impl MockGateway {
    /// Create a mock gateway whose checkout pages are served from `public_url`.
    #[must_use]
    pub fn new(public_url: &str) -> Self {
        Self::with_retention(public_url, SESSION_RETENTION)
    }

    /// Create a mock gateway that forgets session totals after `retention`.
    #[must_use]
    pub fn with_retention(public_url: &str, retention: Duration) -> Self {
        let totals = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_live(retention)
            .build();

        Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            totals,
        }
    }

    /// Mock checkout page URL for a session.
    fn checkout_url(&self, session_id: &str, total: Decimal) -> String {
        format!(
            "{}/mock-checkout?session={session_id}&total={:.2}",
            self.public_url, total
        )
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn mode(&self) -> PaymentMode {
        PaymentMode::Mock
    }

    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let total = checkout::order_total(&request.items);
        let id = format!("{MOCK_SESSION_PREFIX}{}", Utc::now().timestamp_millis());

        if let Some(minor) = price::to_minor_units(total) {
            self.totals.insert(id.clone(), minor).await;
        }

        tracing::info!(session_id = %id, total = %total, "Mock checkout session created");
        Ok(CheckoutSession {
            url: self.checkout_url(&id, total),
            id,
        })
    }

    async fn verify_session(&self, session_id: &str) -> Result<SessionVerification, PaymentError> {
        let amount_total = self.totals.get(session_id).await;

        Ok(SessionVerification {
            status: PAID_STATUS.to_string(),
            customer_email: Some(MOCK_CUSTOMER_EMAIL.to_string()),
            customer_name: None,
            amount_total,
            currency: Some("usd".to_string()),
        })
    }
}
