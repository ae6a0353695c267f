//! Checkout route handlers.
//!
//! The storefront posts its cart, gets back a hosted payment page URL, and
//! after the redirect back verifies the session once.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use eisenbalm_core::checkout::{
    self, CheckoutRequest, CheckoutResponse, SESSION_ID_PARAM, SessionVerification,
};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::payments::{PaymentMode, SessionRequest, is_valid_session_id};
use crate::state::AppState;

/// Build the checkout router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/verify-session/{session_id}", get(verify_session))
        .route("/mock-checkout", get(mock_checkout))
}

/// Create a hosted checkout session for the posted cart.
///
/// # Errors
///
/// Returns 400 for an empty cart or an invalid line, and 500 with the
/// provider's message if the session cannot be created.
async fn create_checkout_session(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>> {
    let Json(body) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let request = SessionRequest::new(body.items, &state.config().frontend_url)?;

    let item_count = request.items.len().to_string();
    let total = checkout::order_total(&request.items).to_string();
    add_breadcrumb(
        "checkout",
        "Creating checkout session",
        Some(&[
            ("items", item_count.as_str()),
            ("total", total.as_str()),
            ("mode", state.payments().mode().label()),
        ]),
    );

    let session = state.payments().create_session(&request).await?;
    tracing::info!(session_id = %session.id, %total, "Redirecting to checkout");

    Ok(Json(CheckoutResponse { url: session.url }))
}

/// Report the payment status of a checkout session.
///
/// # Errors
///
/// Returns 400 for a malformed session ID and 500 with the provider's
/// message if the lookup fails.
async fn verify_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionVerification>> {
    if !is_valid_session_id(&session_id) {
        return Err(AppError::BadRequest("Invalid session ID".to_string()));
    }

    add_breadcrumb(
        "checkout",
        "Verifying checkout session",
        Some(&[("session_id", session_id.as_str())]),
    );

    let verification = state.payments().verify_session(&session_id).await?;
    tracing::info!(
        session_id = %session_id,
        status = %verification.status,
        "Checkout session verified"
    );

    Ok(Json(verification))
}

/// Query of `GET /mock-checkout`.
#[derive(Debug, Deserialize)]
pub struct MockCheckoutQuery {
    pub session: Option<String>,
    pub total: Option<String>,
}

/// Test payment page shown in mock mode.
#[derive(Template, WebTemplate)]
#[template(path = "mock_checkout.html")]
pub struct MockCheckoutTemplate {
    pub session_id: String,
    pub total: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// Render the mock payment page.
///
/// Only served while checkout runs against the mock gateway.
async fn mock_checkout(
    State(state): State<AppState>,
    Query(query): Query<MockCheckoutQuery>,
) -> Result<MockCheckoutTemplate> {
    if state.payments().mode() != PaymentMode::Mock {
        return Err(AppError::NotFound("Not found".to_string()));
    }

    let session_id = query
        .session
        .filter(|id| is_valid_session_id(id))
        .ok_or_else(|| AppError::BadRequest("Invalid session ID".to_string()))?;

    let total = query
        .total
        .and_then(|t| t.parse::<Decimal>().ok())
        .unwrap_or_default()
        .round_dp(2);

    let frontend_url = state.config().frontend_url.trim_end_matches('/');

    Ok(MockCheckoutTemplate {
        success_url: format!("{frontend_url}/success?{SESSION_ID_PARAM}={session_id}"),
        cancel_url: checkout::cancel_url(frontend_url),
        total: format!("{total:.2}"),
        session_id,
    })
}
