//! # storefront-core: Pure Business Logic for the Storefront
//!
//! This crate holds the storefront's business rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (axum)                              │   │
//! │  │    /api/cart ──► /api/orders ──► /api/orders/{id}/paypal       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  pricing  │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │  totals   │  │   Cart    │  │ per-entity│  │   │
//! │  │   │   Order   │  │  shipping │  │  stock    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌──────────────────────────┐  │  ┌──────────────────────────────┐     │
//! │  │ storefront-db (SQLite)   │◄─┴─►│ storefront-payments (PayPal) │     │
//! │  └──────────────────────────┘     └──────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic and 2-decimal wire form
//! - [`pricing`] - `compute_totals` and the store's pricing rules
//! - [`cart`] - Cart and its stock-bounded mutations
//! - [`types`] - Domain types (Product, Order, Identity, etc.)
//! - [`validation`] - Per-entity validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::pricing::{compute_totals, PricingRules};
//! use storefront_core::{LineItem, Money};
//!
//! let items = vec![LineItem {
//!     product_id: "p1".into(),
//!     name: "Polo".into(),
//!     slug: "polo".into(),
//!     image: "/polo.jpg".into(),
//!     unit_price: Money::from_cents(2500),
//!     quantity: 3,
//! }];
//!
//! let totals = compute_totals(&items, &PricingRules::default());
//! assert_eq!(totals.total_price.to_string(), "96.25");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartChange};
pub use error::{CoreError, CoreResult, ValidationError, ValidationErrors};
pub use money::Money;
pub use pricing::{compute_totals, CartTotals, PricingRules};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of products on the landing page.
pub const LATEST_PRODUCTS_LIMIT: u32 = 4;

/// Image shown for a cart line whose product has no images.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.jpg";
