//! # Cart
//!
//! The shopping cart and its pure mutation rules.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Mutations                                       │
//! │                                                                         │
//! │  Shopper Action        Operation              State Change              │
//! │  ──────────────        ─────────              ────────────              │
//! │                                                                         │
//! │  Add to cart ────────► add_product() ───────► qty + 1 or push(qty 1)   │
//! │                                                                         │
//! │  Minus button ───────► remove_one() ────────► qty - 1, drop line at 0  │
//! │                                                                         │
//! │  Order placed ───────► clear() ─────────────► items = [], totals = 0   │
//! │                                                                         │
//! │  Every mutation ends in recalculate(), so totals always match items.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is checked against the *prospective* quantity: a cart holding
//! 5 units of a product with stock 5 cannot grow to 6.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::pricing::{compute_totals, CartTotals, PricingRules};
use crate::types::{LineItem, Product};

/// A shopper's cart.
///
/// ## Invariants
/// - Items are unique by `product_id`
/// - No item has quantity 0
/// - `totals == compute_totals(items)` after every mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub session_cart_id: String,
    pub user_id: Option<String>,
    pub items: Vec<LineItem>,
    #[serde(flatten)]
    pub totals: CartTotals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What `add_product` did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was appended.
    Added,
    /// An existing line's quantity went up by one.
    Updated,
}

impl Cart {
    /// Creates an empty cart for a session.
    pub fn new(
        id: impl Into<String>,
        session_cart_id: impl Into<String>,
        user_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Cart {
            id: id.into(),
            session_cart_id: session_cart_id.into(),
            user_id,
            items: Vec::new(),
            totals: CartTotals::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity + 1, if stock covers it
    /// - Product new to cart: appended at quantity 1, if stock ≥ 1
    ///
    /// `fallback_image` is used for the new line when the product has none.
    pub fn add_product(
        &mut self,
        product: &Product,
        fallback_image: &str,
        rules: &PricingRules,
    ) -> CoreResult<CartChange> {
        let current = self.quantity_of(&product.id);
        let requested = current + 1;

        if !product.has_stock_for(requested) {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
                requested,
            });
        }

        let change = match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(item) => {
                item.quantity = requested;
                CartChange::Updated
            }
            None => {
                self.items.push(LineItem::from_product(product, fallback_image));
                CartChange::Added
            }
        };

        self.recalculate(rules);
        Ok(change)
    }

    /// Removes one unit of a product, dropping the line when it reaches 0.
    ///
    /// Returns the line as it was before the removal.
    pub fn remove_one(&mut self, product_id: &str, rules: &PricingRules) -> CoreResult<LineItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::not_found("Product", product_id))?;

        let before = self.items[index].clone();
        if before.quantity <= 1 {
            self.items.remove(index);
        } else {
            self.items[index].quantity -= 1;
        }

        self.recalculate(rules);
        Ok(before)
    }

    /// Quantity of a product currently held, 0 if absent.
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map_or(0, |i| i.quantity)
    }

    /// Recomputes the four totals from the items.
    pub fn recalculate(&mut self, rules: &PricingRules) {
        self.totals = compute_totals(&self.items, rules);
    }

    /// Empties the cart after an order is placed from it.
    pub fn clear(&mut self) {
        self.items.clear();
        self.totals = CartTotals::default();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            slug: format!("product-{id}"),
            category: "Shirts".to_string(),
            brand: "Acme".to_string(),
            description: "A shirt".to_string(),
            images: vec![format!("/images/{id}.jpg")],
            price: Money::from_cents(price_cents),
            stock,
            rating: 4.5,
            num_reviews: 10,
            is_featured: false,
            banner: None,
            created_at: Utc::now(),
        }
    }

    fn empty_cart() -> Cart {
        Cart::new("cart-1", "session-1", None, Utc::now())
    }

    #[test]
    fn test_add_then_update() {
        let rules = PricingRules::default();
        let mut cart = empty_cart();
        let shirt = product("a", 2500, 10);

        assert_eq!(cart.add_product(&shirt, "", &rules).unwrap(), CartChange::Added);
        assert_eq!(cart.add_product(&shirt, "", &rules).unwrap(), CartChange::Updated);
        assert_eq!(cart.add_product(&shirt, "", &rules).unwrap(), CartChange::Updated);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.quantity_of("a"), 3);
        assert_eq!(cart.totals.total_price.to_string(), "96.25");
        assert_eq!(cart.items[0].image, "/images/a.jpg");
    }

    #[test]
    fn test_stock_bounds_prospective_quantity() {
        let rules = PricingRules::default();
        let mut cart = empty_cart();
        let five = product("a", 100, 5);

        for _ in 0..5 {
            cart.add_product(&five, "", &rules).unwrap();
        }
        let err = cart.add_product(&five, "", &rules).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
        assert_eq!(cart.quantity_of("a"), 5);

        let six = product("a", 100, 6);
        assert_eq!(cart.add_product(&six, "", &rules).unwrap(), CartChange::Updated);
        assert_eq!(cart.quantity_of("a"), 6);
    }

    #[test]
    fn test_out_of_stock_cannot_be_added() {
        let mut cart = empty_cart();
        let err = cart
            .add_product(&product("a", 100, 0), "", &PricingRules::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { requested: 1, .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_until_empty_then_not_found() {
        let rules = PricingRules::default();
        let mut cart = empty_cart();
        let shirt = product("a", 2500, 10);
        cart.add_product(&shirt, "", &rules).unwrap();
        cart.add_product(&shirt, "", &rules).unwrap();

        assert_eq!(cart.remove_one("a", &rules).unwrap().quantity, 2);
        assert_eq!(cart.quantity_of("a"), 1);
        assert_eq!(cart.remove_one("a", &rules).unwrap().quantity, 1);
        assert!(cart.is_empty());
        assert_eq!(cart.totals, CartTotals::default());

        assert!(matches!(
            cart.remove_one("a", &rules),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_fallback_image_when_product_has_none() {
        let mut cart = empty_cart();
        let mut bare = product("a", 100, 1);
        bare.images.clear();
        cart.add_product(&bare, "/placeholder.png", &PricingRules::default())
            .unwrap();
        assert_eq!(cart.items[0].image, "/placeholder.png");
    }

    #[test]
    fn test_clear_resets_totals() {
        let rules = PricingRules::default();
        let mut cart = empty_cart();
        cart.add_product(&product("a", 2500, 3), "", &rules).unwrap();
        cart.add_product(&product("b", 1000, 3), "", &rules).unwrap();
        assert_eq!(cart.total_quantity(), 2);

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.totals.total_price.is_zero());
    }

    #[test]
    fn test_serializes_totals_flat() {
        let rules = PricingRules::default();
        let mut cart = empty_cart();
        cart.add_product(&product("a", 2500, 3), "", &rules).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["itemsPrice"], "25.00");
        assert_eq!(json["shippingPrice"], "10.00");
        assert_eq!(json["sessionCartId"], "session-1");
        assert_eq!(json["items"][0]["quantity"], 1);
    }
}
