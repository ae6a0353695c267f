//! Stripe Checkout client.
//!
//! Talks to the Stripe REST API directly with form-encoded requests
//! (`line_items[0][price_data][currency]=usd`, ...) and basic auth with the
//! secret key as the username.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use eisenbalm_core::checkout::{self, SessionVerification};
use eisenbalm_core::content::SHIPPING_COUNTRIES;

use super::{CheckoutSession, PaymentError, PaymentGateway, PaymentMode, SessionRequest};
use crate::config::StripeConfig;

const STRIPE_API_URL: &str = "https://api.stripe.com/v1";
const CURRENCY: &str = "usd";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<StripeClientInner>,
}

struct StripeClientInner {
    client: reqwest::Client,
    secret_key: SecretString,
    base_url: String,
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Http` if the HTTP client cannot be built.
    pub fn new(config: &StripeConfig) -> Result<Self, PaymentError> {
        Self::with_base_url(config, STRIPE_API_URL)
    }

    /// Create a client against a different API root (e.g., `stripe-mock`).
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Http` if the HTTP client cannot be built.
    pub fn with_base_url(config: &StripeConfig, base_url: &str) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(StripeClientInner {
                client,
                secret_key: config.secret_key.clone(),
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Turn a Stripe response into `T`, or into the error Stripe reported.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| PaymentError::Parse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StripeErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| format!("Stripe request failed with status {status}"));

        tracing::warn!(status = status.as_u16(), %message, "Stripe API error");
        Err(PaymentError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    fn mode(&self) -> PaymentMode {
        PaymentMode::Stripe
    }

    #[instrument(skip(self, request), fields(items = request.items.len()))]
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let response = self
            .inner
            .client
            .post(format!("{}/checkout/sessions", self.inner.base_url))
            .basic_auth(self.inner.secret_key.expose_secret(), None::<&str>)
            .form(&session_form(request))
            .send()
            .await?;

        let session: StripeSession = Self::handle_response(response).await?;
        let url = session
            .url
            .ok_or_else(|| PaymentError::Parse("checkout session has no url".to_string()))?;

        tracing::info!(session_id = %session.id, "Checkout session created");
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    #[instrument(skip(self))]
    async fn verify_session(&self, session_id: &str) -> Result<SessionVerification, PaymentError> {
        let response = self
            .inner
            .client
            .get(format!(
                "{}/checkout/sessions/{session_id}",
                self.inner.base_url
            ))
            .basic_auth(self.inner.secret_key.expose_secret(), None::<&str>)
            .send()
            .await?;

        let session: StripeSession = Self::handle_response(response).await?;
        Ok(session.into())
    }
}

/// Form fields for `POST /v1/checkout/sessions`.
#[must_use]
pub fn session_form(request: &SessionRequest) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = vec![
        ("mode".into(), "payment".into()),
        ("payment_method_types[0]".into(), "card".into()),
        ("billing_address_collection".into(), "required".into()),
        ("success_url".into(), request.success_url()),
        ("cancel_url".into(), request.cancel_url()),
        (
            "metadata[order]".into(),
            checkout::order_metadata(&request.items),
        ),
    ];

    for (i, country) in SHIPPING_COUNTRIES.iter().enumerate() {
        form.push((
            format!("shipping_address_collection[allowed_countries][{i}]"),
            (*country).to_string(),
        ));
    }

    for (i, item) in request.items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        // Items were validated when the request was built.
        let unit_amount = item.unit_amount().unwrap_or_default();

        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        form.push((
            format!("{prefix}[price_data][currency]"),
            CURRENCY.to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            unit_amount.to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
            form.push((
                format!("{prefix}[price_data][product_data][description]"),
                description.to_string(),
            ));
        }
        if let Some(image) = item
            .image
            .as_deref()
            .and_then(|img| checkout::absolute_image_url(&request.frontend_url, img))
        {
            form.push((
                format!("{prefix}[price_data][product_data][images][0]"),
                image,
            ));
        }
    }

    form
}

// =============================================================================
// Stripe wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    payment_status: String,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Deserialize)]
struct CustomerDetails {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl From<StripeSession> for SessionVerification {
    fn from(session: StripeSession) -> Self {
        let (customer_email, customer_name) = session
            .customer_details
            .map_or((None, None), |c| (c.email, c.name));

        Self {
            status: session.payment_status,
            customer_email,
            customer_name,
            amount_total: session.amount_total,
            currency: session.currency,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeApiError,
}

#[derive(Debug, Deserialize)]
struct StripeApiError {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eisenbalm_core::checkout::CheckoutItem;

    use super::*;

    fn field<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn request() -> SessionRequest {
        SessionRequest::new(
            vec![
                CheckoutItem {
                    name: "JESSE A. EISENBALM".to_string(),
                    price: "8.99".parse().unwrap(),
                    quantity: 2,
                    image: Some("/images/products/eisenbalm-1.png".to_string()),
                    description: Some("The Original".to_string()),
                },
                CheckoutItem {
                    name: "Gift wrap".to_string(),
                    price: "1.005".parse().unwrap(),
                    quantity: 1,
                    image: None,
                    description: None,
                },
            ],
            "https://jesseaeisenbalm.com",
        )
        .unwrap()
    }

    #[test]
    fn test_session_form_line_items() {
        let form = session_form(&request());

        assert_eq!(field(&form, "mode"), Some("payment"));
        assert_eq!(field(&form, "line_items[0][quantity]"), Some("2"));
        assert_eq!(field(&form, "line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(field(&form, "line_items[0][price_data][unit_amount]"), Some("899"));
        assert_eq!(
            field(&form, "line_items[0][price_data][product_data][images][0]"),
            Some("https://jesseaeisenbalm.com/images/products/eisenbalm-1.png")
        );
        assert_eq!(
            field(&form, "line_items[0][price_data][product_data][description]"),
            Some("The Original")
        );
        // Half away from zero.
        assert_eq!(field(&form, "line_items[1][price_data][unit_amount]"), Some("101"));
        assert!(field(&form, "line_items[1][price_data][product_data][images][0]").is_none());
    }

    #[test]
    fn test_session_form_redirects_and_collection() {
        let form = session_form(&request());

        assert_eq!(
            field(&form, "success_url"),
            Some("https://jesseaeisenbalm.com/?session_id={CHECKOUT_SESSION_ID}")
        );
        assert_eq!(field(&form, "cancel_url"), Some("https://jesseaeisenbalm.com/"));
        assert_eq!(field(&form, "billing_address_collection"), Some("required"));
        assert_eq!(
            field(&form, "shipping_address_collection[allowed_countries][0]"),
            Some("US")
        );
        assert_eq!(
            form.iter()
                .filter(|(k, _)| k.starts_with("shipping_address_collection"))
                .count(),
            SHIPPING_COUNTRIES.len()
        );

        let metadata: serde_json::Value =
            serde_json::from_str(field(&form, "metadata[order]").unwrap()).unwrap();
        assert_eq!(metadata[0]["qty"], 2);
        assert_eq!(metadata[0]["name"], "JESSE A. EISENBALM");
    }

    #[test]
    fn test_session_into_verification() {
        let json = r#"{
            "id": "cs_test_123",
            "object": "checkout.session",
            "payment_status": "paid",
            "amount_total": 1798,
            "currency": "usd",
            "customer_details": { "email": "jesse@example.com", "name": "Jesse" }
        }"#;
        let session: StripeSession = serde_json::from_str(json).unwrap();
        let verification = SessionVerification::from(session);

        assert!(verification.is_paid());
        assert_eq!(verification.customer_email.as_deref(), Some("jesse@example.com"));
        assert_eq!(verification.customer_name.as_deref(), Some("Jesse"));
        assert_eq!(verification.amount_total, Some(1798));
        assert_eq!(verification.currency.as_deref(), Some("usd"));
    }

    #[test]
    fn test_unpaid_session_without_customer() {
        let json = r#"{"id": "cs_test_456", "payment_status": "unpaid", "customer_details": null}"#;
        let session: StripeSession = serde_json::from_str(json).unwrap();
        let verification = SessionVerification::from(session);

        assert!(!verification.is_paid());
        assert_eq!(verification.status, "unpaid");
        assert!(verification.customer_email.is_none());
    }

    #[test]
    fn test_error_response_deserialization() {
        let json = r#"{"error": {"type": "invalid_request_error", "message": "No such checkout.session: cs_x"}}"#;
        let parsed: StripeErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.error.message.as_deref(),
            Some("No such checkout.session: cs_x")
        );
    }
}
