//! Shopping cart state.
//!
//! The cart lives for a single page session and is never persisted. Every
//! line holds a quantity of at least one; setting a quantity to zero removes
//! the line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::checkout::{CheckoutItem, SessionVerification};
use crate::types::ProductId;

/// A single line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    /// Unit price in USD.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    /// Price of the whole line (`price × quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl From<&CartItem> for CheckoutItem {
    fn from(item: &CartItem) -> Self {
        Self {
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
            image: item.image.clone(),
            description: None,
        }
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Rebuild a cart from previously stored lines.
    ///
    /// Lines with a zero quantity are dropped and repeated product IDs are
    /// merged into the first occurrence.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items.into_iter().filter(|i| i.quantity > 0) {
            match cart.items.iter_mut().find(|i| i.id == item.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Lines currently in the cart, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of a product.
    ///
    /// Increments the existing line if the product is already in the cart,
    /// otherwise appends a new line with quantity 1 and the product's
    /// primary image.
    pub fn add(&mut self, product: &Product) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return;
        }

        self.items.push(CartItem {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.primary_image().map(String::from),
            quantity: 1,
        });
    }

    /// Remove a product's line entirely.
    pub fn remove(&mut self, id: ProductId) {
        self.items.retain(|i| i.id != id);
    }

    /// Set the quantity of a line, removing it when `quantity` is zero.
    ///
    /// Unknown product IDs are ignored.
    pub fn set_quantity(&mut self, id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(id);
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.quantity = quantity;
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Checkout line items for this cart.
    #[must_use]
    pub fn checkout_items(&self) -> Vec<CheckoutItem> {
        self.items.iter().map(CheckoutItem::from).collect()
    }

    /// Apply the outcome of a payment verification.
    ///
    /// A paid session empties the cart. Returns whether the cart was cleared.
    pub fn apply_verification(&mut self, verification: &SessionVerification) -> bool {
        if verification.is_paid() {
            self.clear();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog;

    fn second_product() -> Product {
        Product {
            id: ProductId::new(2),
            name: "GIFT BOX".to_string(),
            price: Decimal::new(1250, 2),
            images: Vec::new(),
            ..catalog::original_balm()
        }
    }

    fn verification(status: &str) -> SessionVerification {
        SessionVerification {
            status: status.to_string(),
            customer_email: Some("test@example.com".to_string()),
            customer_name: None,
            amount_total: Some(899),
            currency: Some("usd".to_string()),
        }
    }

    #[test]
    fn test_add_new_product_appends_line() {
        let mut cart = Cart::new();
        cart.add(&catalog::original_balm());

        assert_eq!(cart.items().len(), 1);
        let line = &cart.items()[0];
        assert_eq!(line.quantity, 1);
        assert_eq!(line.image.as_deref(), Some("/images/products/eisenbalm-1.png"));
    }

    #[test]
    fn test_add_existing_product_increments_quantity() {
        let mut cart = Cart::new();
        let balm = catalog::original_balm();
        cart.add(&balm);
        cart.add(&balm);
        cart.add(&balm);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        let balm = catalog::original_balm();
        cart.add(&balm);
        cart.add(&balm);
        cart.add(&second_product());

        // 2 × 8.99 + 12.50
        assert_eq!(cart.total(), Decimal::new(3048, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_total_matches_sum_of_lines() {
        let mut cart = Cart::new();
        cart.add(&catalog::original_balm());
        cart.add(&second_product());
        cart.set_quantity(ProductId::new(1), 7);
        cart.set_quantity(ProductId::new(2), 4);

        let expected: Decimal = cart
            .items()
            .iter()
            .map(|i| i.price * Decimal::from(i.quantity))
            .sum();
        let expected_count: u32 = cart.items().iter().map(|i| i.quantity).sum();
        assert_eq!(cart.total(), expected);
        assert_eq!(cart.item_count(), expected_count);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add(&catalog::original_balm());
        cart.set_quantity(ProductId::new(1), 0);

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_decrement_last_unit_removes_line() {
        let mut cart = Cart::new();
        let balm = catalog::original_balm();
        cart.add(&balm);
        cart.add(&balm);

        let quantity = cart.items()[0].quantity;
        cart.set_quantity(balm.id, quantity - 1);
        assert_eq!(cart.item_count(), 1);
        cart.set_quantity(balm.id, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_id_is_ignored() {
        let mut cart = Cart::new();
        cart.add(&catalog::original_balm());
        cart.set_quantity(ProductId::new(99), 5);

        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add(&catalog::original_balm());
        cart.add(&second_product());
        cart.remove(ProductId::new(1));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].id, ProductId::new(2));
    }

    #[test]
    fn test_from_items_merges_and_drops_empty_lines() {
        let line = |id: u32, quantity: u32| CartItem {
            id: ProductId::new(id),
            name: format!("item {id}"),
            price: Decimal::new(899, 2),
            image: None,
            quantity,
        };
        let cart = Cart::from_items([line(1, 2), line(2, 0), line(1, 3)]);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_paid_verification_clears_cart() {
        let mut cart = Cart::new();
        cart.add(&catalog::original_balm());

        assert!(!cart.apply_verification(&verification("unpaid")));
        assert_eq!(cart.item_count(), 1);

        assert!(cart.apply_verification(&verification("paid")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_json_uses_numeric_prices() {
        let mut cart = Cart::new();
        cart.add(&catalog::original_balm());

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json[0]["price"], serde_json::json!(8.99));
        assert_eq!(json[0]["id"], serde_json::json!(1));
    }
}
