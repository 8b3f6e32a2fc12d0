//! # Validation Module
//!
//! One typed validator per entity that crosses a trust boundary.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Shape and types                                                   │
//! │  └── Line items keep price and quantity as raw JSON                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required / minimum-length strings                                 │
//! │  ├── Money: non-negative, at most two decimals                         │
//! │  ├── Whole, non-negative quantities                                    │
//! │  └── Closed sets (payment methods)                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign keys (order items → orders, products)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every validator returns *all* failing fields as [`ValidationErrors`].
//!
//! ```rust
//! use storefront_core::validation::parse_payment_method;
//! use storefront_core::PaymentMethod;
//!
//! assert_eq!(parse_payment_method("PayPal").unwrap(), PaymentMethod::PayPal);
//! assert!(parse_payment_method("Bitcoin").is_err());
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ValidationError, ValidationErrors};
use crate::money::Money;
use crate::types::{
    LineItem, LineItemInput, NewOrder, PaymentMethod, PaymentResult, Product, ShippingAddress,
};

pub type ValidationResult<T> = Result<T, ValidationErrors>;

// =============================================================================
// Field Checks
// =============================================================================

fn require(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::Required {
            field: field.to_string(),
        });
    }
}

fn min_len(errors: &mut ValidationErrors, field: &str, value: &str, min: usize) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.push(ValidationError::Required {
            field: field.to_string(),
        });
    } else if len < min {
        errors.push(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }
}

fn non_negative(errors: &mut ValidationErrors, field: &str, value: i64) {
    if value < 0 {
        errors.push(ValidationError::Negative {
            field: field.to_string(),
        });
    }
}

fn amount(errors: &mut ValidationErrors, field: &str, value: &Value) -> Option<Money> {
    if value.is_null() {
        errors.push(ValidationError::Required {
            field: field.to_string(),
        });
        return None;
    }
    Money::deserialize(value)
        .inspect_err(|e| {
            errors.push(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: e.to_string(),
            })
        })
        .ok()
}

fn whole_number(errors: &mut ValidationErrors, field: &str, value: &Value) -> Option<i64> {
    if value.is_null() {
        errors.push(ValidationError::Required {
            field: field.to_string(),
        });
        return None;
    }
    let Some(n) = value.as_i64() else {
        errors.push(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("{value} is not a whole number"),
        });
        return None;
    };
    non_negative(errors, field, n);
    Some(n)
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a submitted line item and converts it.
///
/// ## Rules
/// - `productId`, `name`, `slug`, `image` must not be empty
/// - `unitPrice` is a non-negative amount with at most two decimals
/// - `quantity` is a whole number, not negative
pub fn validate_line_item(input: &LineItemInput) -> ValidationResult<LineItem> {
    let mut errors = ValidationErrors::new();

    require(&mut errors, "productId", &input.product_id);
    require(&mut errors, "name", &input.name);
    require(&mut errors, "slug", &input.slug);
    require(&mut errors, "image", &input.image);
    let unit_price = amount(&mut errors, "unitPrice", &input.unit_price);
    let quantity = whole_number(&mut errors, "quantity", &input.quantity);

    match (unit_price, quantity) {
        (Some(unit_price), Some(quantity)) if errors.is_empty() => Ok(LineItem {
            product_id: input.product_id.clone(),
            name: input.name.clone(),
            slug: input.slug.clone(),
            image: input.image.clone(),
            unit_price,
            quantity,
        }),
        _ => Err(errors),
    }
}

/// Validates a shipping address.
///
/// ## Rules
/// - `fullName` must not be empty
/// - `streetAddress`, `city`, `postalCode`, `country`: at least 3 characters
pub fn validate_shipping_address(address: &ShippingAddress) -> ValidationResult<()> {
    let mut errors = ValidationErrors::new();
    collect_address(&mut errors, "", address);
    errors.into_result()
}

fn collect_address(errors: &mut ValidationErrors, prefix: &str, address: &ShippingAddress) {
    min_len(errors, &format!("{prefix}fullName"), &address.full_name, 1);
    min_len(errors, &format!("{prefix}streetAddress"), &address.street_address, 3);
    min_len(errors, &format!("{prefix}city"), &address.city, 3);
    min_len(errors, &format!("{prefix}postalCode"), &address.postal_code, 3);
    min_len(errors, &format!("{prefix}country"), &address.country, 3);
}

/// Parses a payment method name against the closed set.
pub fn parse_payment_method(value: &str) -> Result<PaymentMethod, ValidationError> {
    PaymentMethod::ALL
        .into_iter()
        .find(|m| m.as_str() == value.trim())
        .ok_or_else(|| ValidationError::NotAllowed {
            field: "paymentMethod".to_string(),
            allowed: PaymentMethod::ALL
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
        })
}

/// Validates an order snapshot before it is written.
///
/// ## Rules
/// - `userId` must not be empty
/// - the shipping address passes [`validate_shipping_address`]
/// - no total is negative
/// - `totalPrice` equals items + shipping + tax
pub fn validate_new_order(order: &NewOrder) -> ValidationResult<()> {
    let mut errors = ValidationErrors::new();
    let totals = &order.totals;

    require(&mut errors, "userId", &order.user_id);
    collect_address(&mut errors, "shippingAddress.", &order.shipping_address);
    non_negative(&mut errors, "itemsPrice", totals.items_price.cents());
    non_negative(&mut errors, "shippingPrice", totals.shipping_price.cents());
    non_negative(&mut errors, "taxPrice", totals.tax_price.cents());
    non_negative(&mut errors, "totalPrice", totals.total_price.cents());

    if totals.items_price + totals.shipping_price + totals.tax_price != totals.total_price {
        errors.push(ValidationError::InvalidFormat {
            field: "totalPrice".to_string(),
            reason: "must equal items + shipping + tax".to_string(),
        });
    }

    errors.into_result()
}

/// Validates a captured payment result. Every field is required.
pub fn validate_payment_result(result: &PaymentResult) -> ValidationResult<()> {
    let mut errors = ValidationErrors::new();

    require(&mut errors, "id", &result.id);
    require(&mut errors, "status", &result.status);
    require(&mut errors, "emailAddress", &result.email_address);
    require(&mut errors, "pricePaid", &result.price_paid);

    errors.into_result()
}

/// Validates a catalog product before insert.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    let mut errors = ValidationErrors::new();

    min_len(&mut errors, "name", &product.name, 3);
    min_len(&mut errors, "slug", &product.slug, 3);
    min_len(&mut errors, "category", &product.category, 3);
    min_len(&mut errors, "brand", &product.brand, 3);
    min_len(&mut errors, "description", &product.description, 3);
    non_negative(&mut errors, "stock", product.stock);
    non_negative(&mut errors, "price", product.price.cents());
    if product.images.is_empty() {
        errors.push(ValidationError::Required {
            field: "images".to_string(),
        });
    }

    errors.into_result()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::CartTotals;
    use serde_json::json;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Ada Lovelace".to_string(),
            street_address: "12 Analytical Way".to_string(),
            city: "London".to_string(),
            postal_code: "N1 9GU".to_string(),
            country: "United Kingdom".to_string(),
            lat: None,
            lng: None,
        }
    }

    fn input() -> LineItemInput {
        LineItemInput {
            product_id: "p1".to_string(),
            name: "Polo".to_string(),
            slug: "polo".to_string(),
            image: "/p.jpg".to_string(),
            unit_price: json!("25.00"),
            quantity: json!(1),
        }
    }

    fn fields(errors: &ValidationErrors) -> Vec<&str> {
        errors.errors().iter().map(|e| e.field()).collect()
    }

    #[test]
    fn test_line_item_reports_every_bad_field() {
        let item = LineItemInput {
            product_id: "".to_string(),
            name: " ".to_string(),
            image: "".to_string(),
            quantity: json!(-1),
            ..input()
        };

        let errors = validate_line_item(&item).unwrap_err();
        assert_eq!(fields(&errors), vec!["productId", "name", "image", "quantity"]);
    }

    #[test]
    fn test_line_item_ok() {
        let item = validate_line_item(&LineItemInput {
            quantity: json!(0),
            ..input()
        })
        .unwrap();
        assert_eq!(item.unit_price, Money::from_cents(2500));
        assert_eq!(item.quantity, 0);
    }

    #[test]
    fn test_line_item_bad_amounts_listed_with_other_fields() {
        let item = LineItemInput {
            product_id: "".to_string(),
            name: "".to_string(),
            unit_price: json!("25.555"),
            quantity: json!(1.5),
            ..input()
        };

        let errors = validate_line_item(&item).unwrap_err();
        assert_eq!(fields(&errors), vec!["productId", "name", "unitPrice", "quantity"]);
        assert_eq!(
            errors.errors()[2],
            ValidationError::InvalidFormat {
                field: "unitPrice".to_string(),
                reason: "'25.555' has more than two decimal places".to_string(),
            }
        );
    }

    #[test]
    fn test_line_item_missing_amounts_are_required() {
        let item = LineItemInput {
            unit_price: Value::Null,
            quantity: Value::Null,
            ..input()
        };

        let errors = validate_line_item(&item).unwrap_err();
        assert!(errors
            .errors()
            .iter()
            .all(|e| matches!(e, ValidationError::Required { .. })));
        assert_eq!(fields(&errors), vec!["unitPrice", "quantity"]);
    }

    #[test]
    fn test_line_item_rejects_negative_price() {
        let errors = validate_line_item(&LineItemInput {
            unit_price: json!("-1.00"),
            ..input()
        })
        .unwrap_err();
        assert_eq!(fields(&errors), vec!["unitPrice"]);
    }

    #[test]
    fn test_address_minimum_lengths() {
        assert!(validate_shipping_address(&address()).is_ok());

        let mut short = address();
        short.city = "NY".to_string();
        short.full_name = "".to_string();
        let errors = validate_shipping_address(&short).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[
                ValidationError::Required {
                    field: "fullName".to_string()
                },
                ValidationError::TooShort {
                    field: "city".to_string(),
                    min: 3
                },
            ]
        );
    }

    #[test]
    fn test_payment_method_closed_set() {
        assert_eq!(
            parse_payment_method("CashOnDelivery").unwrap(),
            PaymentMethod::CashOnDelivery
        );
        assert!(matches!(
            parse_payment_method("paypal"),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_new_order_totals_must_add_up() {
        let mut order = NewOrder {
            user_id: "u1".to_string(),
            shipping_address: address(),
            payment_method: PaymentMethod::PayPal,
            totals: CartTotals {
                items_price: Money::from_cents(7500),
                shipping_price: Money::from_cents(1000),
                tax_price: Money::from_cents(1125),
                total_price: Money::from_cents(9625),
            },
        };
        assert!(validate_new_order(&order).is_ok());

        order.totals.total_price = Money::from_cents(9600);
        let errors = validate_new_order(&order).unwrap_err();
        assert_eq!(errors.errors()[0].field(), "totalPrice");
    }

    #[test]
    fn test_new_order_prefixes_address_fields() {
        let mut bad = address();
        bad.country = "U".to_string();
        let order = NewOrder {
            user_id: "u1".to_string(),
            shipping_address: bad,
            payment_method: PaymentMethod::Stripe,
            totals: CartTotals::default(),
        };
        let errors = validate_new_order(&order).unwrap_err();
        assert_eq!(errors.errors()[0].field(), "shippingAddress.country");
    }

    #[test]
    fn test_payment_result_requires_all_fields() {
        let pending = PaymentResult::pending("PP-1");
        let errors = validate_payment_result(&pending).unwrap_err();
        assert_eq!(errors.errors().len(), 3);
    }
}
