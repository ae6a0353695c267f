//! The product catalog.
//!
//! The storefront sells a single, hard-coded product. It lives here as data
//! rather than in a database table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A product offered by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub subtitle: String,
    /// Unit price in USD.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Image paths, root-relative to the storefront. The first is the primary image.
    pub images: Vec<String>,
    pub description: String,
    pub features: Vec<String>,
    pub volume: String,
}

impl Product {
    /// The primary image shown in the cart and at checkout.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// The original lip balm, release 001.
#[must_use]
pub fn original_balm() -> Product {
    Product {
        id: ProductId::new(1),
        name: "JESSE A. EISENBALM".to_string(),
        subtitle: "The Original".to_string(),
        price: Decimal::new(899, 2),
        images: vec![
            "/images/products/eisenbalm-1.png".to_string(),
            "/images/products/eisenbalm-2.png".to_string(),
            "/images/products/eisenbalm-3.png".to_string(),
        ],
        description: "Limited Edition. Release 001. Hand numbered.".to_string(),
        features: vec![
            "Beeswax formula".to_string(),
            "All-day hydration".to_string(),
            "Daily ritual".to_string(),
            "Reminder of your humanity".to_string(),
            "And mortality".to_string(),
        ],
        volume: "4.5g / 0.15 oz".to_string(),
    }
}

/// All products in the catalog.
#[must_use]
pub fn products() -> Vec<Product> {
    vec![original_balm()]
}

/// Look up a product by ID.
#[must_use]
pub fn find(id: ProductId) -> Option<Product> {
    products().into_iter().find(|p| p.id == id)
}
