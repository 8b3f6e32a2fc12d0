//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    LineItem     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  product_id     │   │  id (UUID)      │       │
//! │  │  slug           │──►│  unit_price     │──►│  4 totals       │       │
//! │  │  price, stock   │   │  quantity       │   │  is_paid        │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                       │                 │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────▼────────┐       │
//! │  │    Identity     │   │ ShippingAddress │   │  OrderItem      │       │
//! │  │  user_id?       │   │ PaymentMethod   │   │  (snapshot)     │       │
//! │  │  session_cart?  │   │ PaymentResult   │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::pricing::CartTotals;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1500 bps = 15%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// The storefront core only reads products: price, name and stock come
/// from here when a line item is added, and stock is decremented when
/// an order is paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub brand: String,
    pub description: String,
    pub images: Vec<String>,
    pub price: Money,
    /// Units on hand. May go negative when two carts race for the last unit.
    pub stock: i64,
    /// Average review score, 0.00 - 5.00.
    pub rating: f64,
    pub num_reviews: i64,
    pub is_featured: bool,
    pub banner: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// First catalog image, used as the cart thumbnail.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Checks whether `quantity` units could be held in one cart.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product line in a cart.
///
/// `product_id` is the line's identity: a cart never holds two lines for
/// the same product, and never holds a line with quantity 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl LineItem {
    /// Builds a quantity-1 line from the catalog record.
    ///
    /// `fallback_image` is used when the product has no images.
    pub fn from_product(product: &Product, fallback_image: &str) -> Self {
        LineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product
                .primary_image()
                .unwrap_or(fallback_image)
                .to_string(),
            unit_price: product.price,
            quantity: 1,
        }
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A line item as a client submits it, before validation.
///
/// `unit_price` and `quantity` stay raw JSON so that a malformed value is
/// reported next to the other bad fields. Missing fields default to empty.
/// See [`validate_line_item`](crate::validation::validate_line_item).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItemInput {
    pub product_id: String,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub unit_price: serde_json::Value,
    pub quantity: serde_json::Value,
}

impl From<&LineItem> for LineItemInput {
    fn from(item: &LineItem) -> Self {
        LineItemInput {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            slug: item.slug.clone(),
            image: item.image.clone(),
            unit_price: serde_json::Value::String(item.unit_price.to_string()),
            quantity: item.quantity.into(),
        }
    }
}

// =============================================================================
// Identity
// =============================================================================

/// Who is making the request.
///
/// Supplied by the session provider on every request. Anonymous shoppers
/// carry only a session cart id; signed-in shoppers also carry a user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: Option<String>,
    pub session_cart_id: Option<String>,
}

/// The key a cart is looked up by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOwner {
    User(String),
    Session(String),
}

impl Identity {
    pub fn anonymous(session_cart_id: impl Into<String>) -> Self {
        Identity {
            user_id: None,
            session_cart_id: Some(session_cart_id.into()),
        }
    }

    pub fn signed_in(user_id: impl Into<String>, session_cart_id: impl Into<String>) -> Self {
        Identity {
            user_id: Some(user_id.into()),
            session_cart_id: Some(session_cart_id.into()),
        }
    }

    /// Owner key precedence: the user id wins when present.
    pub fn cart_owner(&self) -> Option<CartOwner> {
        match (&self.user_id, &self.session_cart_id) {
            (Some(user_id), _) => Some(CartOwner::User(user_id.clone())),
            (None, Some(session)) => Some(CartOwner::Session(session.clone())),
            (None, None) => None,
        }
    }
}

// =============================================================================
// Checkout Details
// =============================================================================

/// Where an order ships to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub street_address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// How the shopper intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum PaymentMethod {
    #[default]
    PayPal,
    Stripe,
    CashOnDelivery,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::PayPal,
        PaymentMethod::Stripe,
        PaymentMethod::CashOnDelivery,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::Stripe => "Stripe",
            PaymentMethod::CashOnDelivery => "CashOnDelivery",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the gateway reported about a payment.
///
/// Between `initiate_payment` and `confirm_payment` only `id` is set;
/// the other fields are blank until capture completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub id: String,
    pub status: String,
    pub email_address: String,
    pub price_paid: String,
}

impl PaymentResult {
    /// The placeholder stored when a gateway order is created.
    pub fn pending(external_id: impl Into<String>) -> Self {
        PaymentResult {
            id: external_id.into(),
            ..Default::default()
        }
    }
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

/// A registered shopper, as checkout sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub address: Option<ShippingAddress>,
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// Everything needed to place an order, before it has an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: String,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub totals: CartTotals,
}

/// A placed order. Totals are frozen at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub items_price: Money,
    pub shipping_price: Money,
    pub tax_price: Money,
    pub total_price: Money,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub payment_result: Option<PaymentResult>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates an unpaid, undelivered order from a validated `NewOrder`.
    pub fn place(id: impl Into<String>, new: NewOrder, now: DateTime<Utc>) -> Self {
        Order {
            id: id.into(),
            user_id: new.user_id,
            shipping_address: new.shipping_address,
            payment_method: new.payment_method,
            items_price: new.totals.items_price,
            shipping_price: new.totals.shipping_price,
            tax_price: new.totals.tax_price,
            total_price: new.totals.total_price,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            payment_result: None,
            created_at: now,
        }
    }

    /// The gateway reference stored by `initiate_payment`, if any.
    pub fn pending_reference(&self) -> Option<&str> {
        self.payment_result
            .as_ref()
            .map(|r| r.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// A frozen copy of a line item bound to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub order_id: String,
    pub product_id: String,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub price: Money,
    pub quantity: i64,
}

impl OrderItem {
    pub fn snapshot(order_id: &str, item: &LineItem) -> Self {
        OrderItem {
            order_id: order_id.to_string(),
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            slug: item.slug.clone(),
            image: item.image.clone(),
            price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_wins_owner_precedence() {
        let identity = Identity::signed_in("user-1", "session-1");
        assert_eq!(identity.cart_owner(), Some(CartOwner::User("user-1".into())));

        let anon = Identity::anonymous("session-1");
        assert_eq!(anon.cart_owner(), Some(CartOwner::Session("session-1".into())));

        assert_eq!(Identity::default().cart_owner(), None);
    }

    #[test]
    fn test_payment_method_wire_names() {
        let json = serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap();
        assert_eq!(json, "\"CashOnDelivery\"");
        let parsed: PaymentMethod = serde_json::from_str("\"PayPal\"").unwrap();
        assert_eq!(parsed, PaymentMethod::PayPal);
    }

    #[test]
    fn test_pending_reference_ignores_blank_ids() {
        let mut order = Order::place(
            "order-1",
            NewOrder {
                user_id: "user-1".into(),
                shipping_address: ShippingAddress {
                    full_name: "Ada".into(),
                    street_address: "1 Main St".into(),
                    city: "Springfield".into(),
                    postal_code: "12345".into(),
                    country: "USA".into(),
                    lat: None,
                    lng: None,
                },
                payment_method: PaymentMethod::PayPal,
                totals: CartTotals::default(),
            },
            Utc::now(),
        );
        assert_eq!(order.pending_reference(), None);

        order.payment_result = Some(PaymentResult::default());
        assert_eq!(order.pending_reference(), None);

        order.payment_result = Some(PaymentResult::pending("PP-1"));
        assert_eq!(order.pending_reference(), Some("PP-1"));
    }
}
