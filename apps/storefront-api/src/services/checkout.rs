//! # Checkout Service
//!
//! Turns a signed-in shopper's cart into an order.
//!
//! ## Order Placement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_order(identity)                                                 │
//! │       │                                                                 │
//! │       ├── no user id ─────────────────────► Err(Unauthenticated)        │
//! │       ├── cart missing or empty ──────────► Redirect /cart              │
//! │       ├── no saved address ───────────────► Redirect /shipping-address  │
//! │       ├── no saved payment method ────────► Redirect /payment-method    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate NewOrder (totals copied from the cart)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────── UnitOfWork ───────────────────┐                  │
//! │  │  INSERT orders                                    │                  │
//! │  │  INSERT order_items (one per cart line)           │  any failure     │
//! │  │  UPDATE carts SET items = '[]', totals = 0        │  ──► ROLLBACK    │
//! │  └───────────────────────── COMMIT ─────────────────┘                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Placed { order_id } ──► /order/{id}                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use storefront_core::validation::{
    parse_payment_method, validate_new_order, validate_shipping_address,
};
use storefront_core::{CoreError, Identity, NewOrder, Order, OrderItem, ShippingAddress, User};
use storefront_db::UnitOfWork;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ActionResult, ApiResult};
use crate::services::settle;
use crate::state::AppState;

/// Result of a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The order was written and the cart emptied.
    Placed { order_id: String },
    /// A precondition is missing; the shopper is sent to fix it.
    Redirect { message: &'static str, to: &'static str },
}

impl CheckoutOutcome {
    const EMPTY_CART: Self = CheckoutOutcome::Redirect {
        message: "Your cart is empty",
        to: "/cart",
    };
    const NO_ADDRESS: Self = CheckoutOutcome::Redirect {
        message: "No shipping address found.",
        to: "/shipping-address",
    };
    const NO_PAYMENT_METHOD: Self = CheckoutOutcome::Redirect {
        message: "No payment method found.",
        to: "/payment-method",
    };
}

impl From<CheckoutOutcome> for ActionResult {
    fn from(outcome: CheckoutOutcome) -> Self {
        match outcome {
            CheckoutOutcome::Placed { order_id } => {
                ActionResult::ok_then("Order created", format!("/order/{order_id}"))
            }
            CheckoutOutcome::Redirect { message, to } => ActionResult::redirect(message, to),
        }
    }
}

/// Places an order from the caller's cart.
pub async fn create_order(state: &AppState, identity: &Identity) -> ApiResult<CheckoutOutcome> {
    let user = signed_in_user(state, identity).await?;

    let cart = match state.db.carts().find_by_user(&user.id).await? {
        Some(cart) if !cart.is_empty() => cart,
        _ => return Ok(CheckoutOutcome::EMPTY_CART),
    };
    let Some(shipping_address) = user.address else {
        return Ok(CheckoutOutcome::NO_ADDRESS);
    };
    let Some(payment_method) = user.payment_method else {
        return Ok(CheckoutOutcome::NO_PAYMENT_METHOD);
    };

    let new_order = NewOrder {
        user_id: user.id,
        shipping_address,
        payment_method,
        totals: cart.totals,
    };
    validate_new_order(&new_order)?;

    let order = Order::place(Uuid::new_v4().to_string(), new_order, Utc::now());
    let items: Vec<OrderItem> = cart
        .items
        .iter()
        .map(|line| OrderItem::snapshot(&order.id, line))
        .collect();

    let mut uow = state.db.begin().await?;
    let written = write_order(state, &mut uow, &order, &items, &cart.id).await;
    settle(uow, written).await?;

    info!(
        order_id = %order.id,
        user_id = %order.user_id,
        total = %order.total_price,
        lines = items.len(),
        "Order placed"
    );
    Ok(CheckoutOutcome::Placed { order_id: order.id })
}

async fn write_order(
    state: &AppState,
    uow: &mut UnitOfWork,
    order: &Order,
    items: &[OrderItem],
    cart_id: &str,
) -> ApiResult<()> {
    let orders = state.db.orders();
    orders.insert(uow, order).await?;
    for item in items {
        orders.insert_item(uow, item).await?;
    }
    state.db.carts().clear(uow, cart_id).await?;
    Ok(())
}

async fn signed_in_user(state: &AppState, identity: &Identity) -> ApiResult<User> {
    let user_id = identity.user_id.as_deref().ok_or(CoreError::Unauthenticated)?;
    let user = state
        .db
        .users()
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user_id))?;
    Ok(user)
}

/// Saves the address used by the next checkout.
pub async fn update_shipping_address(
    state: &AppState,
    identity: &Identity,
    address: &ShippingAddress,
) -> ApiResult<()> {
    let user = signed_in_user(state, identity).await?;
    validate_shipping_address(address)?;
    state.db.users().update_address(&user.id, address).await?;
    debug!(user_id = %user.id, "Shipping address saved");
    Ok(())
}

/// Saves the payment method used by the next checkout.
pub async fn update_payment_method(state: &AppState, identity: &Identity, method: &str) -> ApiResult<()> {
    let user = signed_in_user(state, identity).await?;
    let method = parse_payment_method(method)?;
    state.db.users().update_payment_method(&user.id, method).await?;
    debug!(user_id = %user.id, method = %method, "Payment method saved");
    Ok(())
}

/// An order with its lines and buyer, as the order page shows it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderItem>,
    pub user: Option<Buyer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Buyer {
    pub name: String,
    pub email: String,
}

pub async fn get_order(state: &AppState, order_id: &str) -> ApiResult<OrderDetails> {
    let order = state
        .db
        .orders()
        .get_by_id(order_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Order", order_id))?;
    let order_items = state.db.orders().get_items(order_id).await?;
    let user = state
        .db
        .users()
        .get_by_id(&order.user_id)
        .await?
        .map(|u| Buyer {
            name: u.name,
            email: u.email,
        });

    Ok(OrderDetails {
        order,
        order_items,
        user,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::cart::{add_item, get_cart};
    use crate::test_support::{address, idle_gateway, line_for, seed_product, seed_user, test_state};
    use storefront_core::{Money, PaymentMethod};

    fn shopper() -> Identity {
        Identity::signed_in("u1", "s-1")
    }

    #[tokio::test]
    async fn test_place_order_end_to_end() {
        let state = test_state(idle_gateway()).await;
        seed_user(&state, "u1", true).await;
        let product = seed_product(&state, "p1", 2500, 10).await;
        for _ in 0..3 {
            add_item(&state, &shopper(), &line_for(&product)).await.unwrap();
        }

        let outcome = create_order(&state, &shopper()).await.unwrap();
        let CheckoutOutcome::Placed { order_id } = outcome else {
            panic!("expected a placed order, got {outcome:?}");
        };

        let details = get_order(&state, &order_id).await.unwrap();
        assert_eq!(details.order.items_price, Money::from_cents(7500));
        assert_eq!(details.order.shipping_price, Money::from_cents(1000));
        assert_eq!(details.order.tax_price, Money::from_cents(1125));
        assert_eq!(details.order.total_price, Money::from_cents(9625));
        assert!(!details.order.is_paid);
        assert_eq!(details.order_items.len(), 1);
        assert_eq!(details.order_items[0].quantity, 3);
        assert_eq!(details.order_items[0].price, Money::from_cents(2500));
        assert_eq!(details.user.unwrap().email, "u1@example.com");

        let cart = get_cart(&state, &shopper()).await.unwrap().unwrap();
        assert!(cart.is_empty());
        assert!(cart.totals.total_price.is_zero());

        let action = ActionResult::from(CheckoutOutcome::Placed { order_id: order_id.clone() });
        assert_eq!(action.redirect_to, Some(format!("/order/{order_id}")));
    }

    #[tokio::test]
    async fn test_requires_signed_in_user() {
        let state = test_state(idle_gateway()).await;
        let err = create_order(&state, &Identity::anonymous("s-1")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);

        let err = create_order(&state, &Identity::signed_in("ghost", "s-1"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_redirects_in_order() {
        let state = test_state(idle_gateway()).await;
        seed_user(&state, "u1", false).await;

        let outcome = create_order(&state, &shopper()).await.unwrap();
        assert_eq!(outcome, CheckoutOutcome::EMPTY_CART);

        let product = seed_product(&state, "p1", 2500, 10).await;
        add_item(&state, &shopper(), &line_for(&product)).await.unwrap();
        let outcome = create_order(&state, &shopper()).await.unwrap();
        assert_eq!(outcome, CheckoutOutcome::NO_ADDRESS);

        update_shipping_address(&state, &shopper(), &address()).await.unwrap();
        let outcome = create_order(&state, &shopper()).await.unwrap();
        assert_eq!(outcome, CheckoutOutcome::NO_PAYMENT_METHOD);

        let action = ActionResult::from(outcome);
        assert!(!action.success);
        assert_eq!(action.redirect_to.as_deref(), Some("/payment-method"));

        update_payment_method(&state, &shopper(), "PayPal").await.unwrap();
        let outcome = create_order(&state, &shopper()).await.unwrap();
        assert!(matches!(outcome, CheckoutOutcome::Placed { .. }));
    }

    #[tokio::test]
    async fn test_failed_item_insert_rolls_back_everything() {
        let state = test_state(idle_gateway()).await;
        seed_user(&state, "u1", true).await;
        let product = seed_product(&state, "p1", 2500, 10).await;
        add_item(&state, &shopper(), &line_for(&product)).await.unwrap();

        // The order header inserts; its item then fails the product reference.
        state.db.products().delete("p1").await.unwrap();

        let err = create_order(&state, &shopper()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert_eq!(state.db.orders().count().await.unwrap(), 0);
        let cart = get_cart(&state, &shopper()).await.unwrap().unwrap();
        assert_eq!(cart.quantity_of("p1"), 1);
        assert_eq!(cart.totals.items_price, Money::from_cents(2500));
    }

    #[tokio::test]
    async fn test_invalid_checkout_details() {
        let state = test_state(idle_gateway()).await;
        seed_user(&state, "u1", false).await;

        let mut bad = address();
        bad.city = "NY".into();
        bad.country = String::new();
        let err = update_shipping_address(&state, &shopper(), &bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.errors.unwrap().errors().len(), 2);

        let err = update_payment_method(&state, &shopper(), "Bitcoin").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        update_payment_method(&state, &shopper(), "Stripe").await.unwrap();
        let user = state.db.users().get_by_id("u1").await.unwrap().unwrap();
        assert_eq!(user.payment_method, Some(PaymentMethod::Stripe));
    }

    #[tokio::test]
    async fn test_get_unknown_order() {
        let state = test_state(idle_gateway()).await;
        let err = get_order(&state, "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
