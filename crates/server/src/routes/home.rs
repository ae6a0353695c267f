//! Root status and static content routes.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use eisenbalm_core::Product;
use eisenbalm_core::catalog;
use eisenbalm_core::content::{FAQ, FaqEntry};

use crate::state::AppState;

/// Build the home and content router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(status))
        .route("/api/faq", get(faq))
        .route("/api/products", get(products))
}

/// Response for `GET /`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
}

/// Report that the server is up and which payment mode it runs in.
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let mode = state.payments().mode().label();
    Json(StatusResponse {
        message: format!("Jesse A. Eisenbalm Server is running! ({mode} Mode)"),
    })
}

#[derive(Debug, Serialize)]
struct FaqResponse {
    faq: &'static [FaqEntry],
}

async fn faq() -> Json<FaqResponse> {
    Json(FaqResponse { faq: &FAQ })
}

#[derive(Debug, Serialize)]
struct ProductsResponse {
    products: Vec<Product>,
}

async fn products() -> Json<ProductsResponse> {
    Json(ProductsResponse {
        products: catalog::products(),
    })
}
