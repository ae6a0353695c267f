//! Checkout request/response contract.
//!
//! The storefront posts its cart lines to the server, which creates a hosted
//! checkout session with the payment provider and answers with a redirect
//! URL. After payment the provider redirects back to the storefront with a
//! `session_id` query parameter; the storefront verifies it once, clears the
//! cart when paid, and strips the parameter from the address bar.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::types::price;

/// Query parameter carrying the checkout session ID on the success redirect.
pub const SESSION_ID_PARAM: &str = "session_id";

/// Placeholder the payment provider substitutes with the real session ID.
pub const SESSION_ID_TEMPLATE: &str = "{CHECKOUT_SESSION_ID}";

/// Payment status reported for a completed payment.
pub const PAID_STATUS: &str = "paid";

/// A line item submitted for checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub name: String,
    /// Unit price in USD.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CheckoutItem {
    /// Unit price in integer minor units (cents).
    #[must_use]
    pub fn unit_amount(&self) -> Option<i64> {
        price::to_minor_units(self.price)
    }
}

/// Body of `POST /create-checkout-session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
}

/// Response of `POST /create-checkout-session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    /// Hosted payment page to redirect the browser to.
    pub url: String,
}

/// Order summary line attached to the session as metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub qty: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Reasons a checkout request is rejected before reaching the provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Invalid quantity for {0}")]
    InvalidQuantity(String),
    #[error("Invalid price for {0}")]
    InvalidPrice(String),
}

/// Validate line items before a session is created.
///
/// # Errors
///
/// Returns `CheckoutError` if there are no items, any quantity is zero, or
/// any price is negative or too large to express in minor units.
pub fn validate_items(items: &[CheckoutItem]) -> Result<(), CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    for item in items {
        if item.quantity == 0 {
            return Err(CheckoutError::InvalidQuantity(item.name.clone()));
        }
        if item.price.is_sign_negative() || item.unit_amount().is_none() {
            return Err(CheckoutError::InvalidPrice(item.name.clone()));
        }
    }

    Ok(())
}

/// Sum of `price × quantity` over all items.
#[must_use]
pub fn order_total(items: &[CheckoutItem]) -> Decimal {
    items
        .iter()
        .map(|i| i.price * Decimal::from(i.quantity))
        .sum()
}

/// Serialized order summary (`[{name, qty, price}]`) for session metadata.
#[must_use]
pub fn order_metadata(items: &[CheckoutItem]) -> String {
    let lines: Vec<OrderLine> = items
        .iter()
        .map(|i| OrderLine {
            name: i.name.clone(),
            qty: i.quantity,
            price: i.price,
        })
        .collect();

    // Serializing plain strings and numbers cannot fail.
    serde_json::to_string(&lines).unwrap_or_default()
}

/// Make a root-relative image path absolute against the storefront URL.
///
/// Absolute URLs pass through unchanged; anything else is dropped because
/// the provider only accepts absolute image URLs.
#[must_use]
pub fn absolute_image_url(frontend_url: &str, image: &str) -> Option<String> {
    if image.starts_with("http://") || image.starts_with("https://") {
        return Some(image.to_string());
    }
    if image.starts_with('/') {
        return Some(format!("{}{image}", frontend_url.trim_end_matches('/')));
    }
    None
}

/// Success redirect URL handed to the provider.
#[must_use]
pub fn success_url(frontend_url: &str) -> String {
    format!(
        "{}/?{SESSION_ID_PARAM}={SESSION_ID_TEMPLATE}",
        frontend_url.trim_end_matches('/')
    )
}

/// Cancel redirect URL handed to the provider.
#[must_use]
pub fn cancel_url(frontend_url: &str) -> String {
    format!("{}/", frontend_url.trim_end_matches('/'))
}

/// Result of verifying a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionVerification {
    /// `paid`, or whatever other status the provider reports.
    pub status: String,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    /// Total charged, in minor currency units.
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
}

impl SessionVerification {
    /// Whether the provider reports the session as paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status == PAID_STATUS
    }
}

/// Extract the checkout session ID from a success redirect URL.
#[must_use]
pub fn session_id_from_url(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == SESSION_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// The same URL without the `session_id` parameter.
///
/// Used as the replace-state target so a reload does not verify twice.
#[must_use]
pub fn strip_session_id(url: &Url) -> Url {
    let remaining: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SESSION_ID_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut stripped = url.clone();
    if remaining.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.query_pairs_mut().clear().extend_pairs(remaining);
    }
    stripped
}
