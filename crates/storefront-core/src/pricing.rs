//! # Pricing
//!
//! Order-total computation shared by carts and orders.
//!
//! ```text
//! items ──► items_price = Σ unit_price × quantity
//!                │
//!                ├──► shipping_price = 0 if items_price > threshold, else flat fee
//!                ├──► tax_price      = items_price × rate, half-cent up
//!                ▼
//!          total_price = items + shipping + tax
//! ```
//!
//! `compute_totals` is a pure function of its inputs, so a cart's totals
//! can be recomputed at any time and always agree with its items.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{LineItem, TaxRate};

/// Store-wide pricing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRules {
    /// Orders strictly above this ship free.
    pub free_shipping_threshold: Money,
    pub flat_shipping_fee: Money,
    pub tax_rate: TaxRate,
}

impl Default for PricingRules {
    fn default() -> Self {
        PricingRules {
            free_shipping_threshold: Money::from_cents(10_000),
            flat_shipping_fee: Money::from_cents(1_000),
            tax_rate: TaxRate::from_bps(1_500),
        }
    }
}

/// The four derived amounts carried by carts and orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub items_price: Money,
    pub shipping_price: Money,
    pub tax_price: Money,
    pub total_price: Money,
}

/// Computes cart totals from line items.
///
/// An empty item list yields all-zero totals, shipping included.
pub fn compute_totals(items: &[LineItem], rules: &PricingRules) -> CartTotals {
    if items.is_empty() {
        return CartTotals::default();
    }

    let items_price: Money = items.iter().map(LineItem::line_total).sum();
    let shipping_price = if items_price > rules.free_shipping_threshold {
        Money::zero()
    } else {
        rules.flat_shipping_fee
    };
    let tax_price = items_price.calculate_tax(rules.tax_rate);

    CartTotals {
        items_price,
        shipping_price,
        tax_price,
        total_price: items_price + shipping_price + tax_price,
    }
}
