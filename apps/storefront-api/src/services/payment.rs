//! # Payment Service
//!
//! Moves an order from unpaid to paid through the payment gateway.
//!
//! ## Payment State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────┐  initiate_payment   ┌──────────────────┐                  │
//! │  │  Unpaid  │────────────────────►│  Unpaid          │                  │
//! │  │          │  gateway order id   │  + pending ref   │                  │
//! │  └──────────┘  stored             └────────┬─────────┘                  │
//! │                                            │ confirm_payment            │
//! │                                            │ (ref matches, COMPLETED)   │
//! │                                            ▼                            │
//! │                                   ┌──────────────────┐                  │
//! │                                   │  Paid (terminal) │                  │
//! │                                   └──────────────────┘                  │
//! │                                                                         │
//! │  confirm_payment unit of work:                                          │
//! │    stock -= quantity for every order item                               │
//! │    is_paid = 1 WHERE is_paid = 0   (0 rows ⇒ AlreadyPaid, rollback)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Gateway failures are returned as they are; nothing is retried. A capture
//! that fails on an order a concurrent confirmation has already paid is
//! reported as `AlreadyPaid`.

use chrono::Utc;
use storefront_core::validation::validate_payment_result;
use storefront_core::{CoreError, Order, PaymentResult};
use storefront_db::UnitOfWork;
use storefront_payments::PaymentError;
use tracing::{error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::services::settle;
use crate::state::AppState;

async fn load_unpaid(state: &AppState, order_id: &str) -> ApiResult<Order> {
    let order = state
        .db
        .orders()
        .get_by_id(order_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Order", order_id))?;

    if order.is_paid {
        warn!(order_id = %order_id, "Payment attempted on a paid order");
        return Err(CoreError::AlreadyPaid(order_id.to_string()).into());
    }
    Ok(order)
}

/// Creates a gateway order for the order total and remembers its id.
///
/// Returns the gateway order id the shopper approves.
pub async fn initiate_payment(state: &AppState, order_id: &str) -> ApiResult<String> {
    let order = load_unpaid(state, order_id).await?;

    let external_id = state.gateway.create_order(order.total_price).await?;

    let recorded = state
        .db
        .orders()
        .set_pending_payment(order_id, &PaymentResult::pending(&external_id))
        .await?;
    if !recorded {
        return Err(CoreError::AlreadyPaid(order_id.to_string()).into());
    }

    info!(order_id = %order_id, external_id = %external_id, total = %order.total_price, "Payment initiated");
    Ok(external_id)
}

/// Captures an approved gateway order and marks the order paid.
///
/// ## Checks, in order
/// 1. The order exists and is unpaid (no gateway call otherwise)
/// 2. `external_order_id` is the reference stored by [`initiate_payment`]
/// 3. The capture reports the same id with status `COMPLETED`
pub async fn confirm_payment(
    state: &AppState,
    order_id: &str,
    external_order_id: &str,
) -> ApiResult<Order> {
    let order = load_unpaid(state, order_id).await?;

    match order.pending_reference() {
        Some(reference) if reference == external_order_id => {}
        Some(_) => {
            warn!(order_id = %order_id, "Confirmation does not match the pending payment");
            return Err(CoreError::payment_mismatch("gateway order does not match the pending payment").into());
        }
        None => {
            return Err(CoreError::payment_mismatch("no payment has been started for this order").into());
        }
    }

    let capture = match state.gateway.capture_payment(external_order_id).await {
        Ok(capture) => capture,
        Err(err) => return Err(capture_failed(state, order_id, err).await),
    };

    if capture.id != external_order_id {
        error!(order_id = %order_id, captured = %capture.id, "Gateway captured a different order");
        return Err(CoreError::payment_mismatch("captured gateway order differs from the one requested").into());
    }
    if !capture.is_completed() {
        warn!(order_id = %order_id, status = %capture.status, "Capture not completed");
        return Err(CoreError::payment_mismatch(format!("capture status is {}", capture.status)).into());
    }

    let result = PaymentResult {
        id: capture.id,
        status: capture.status,
        email_address: capture.payer_email,
        price_paid: capture.amount_paid,
    };
    if let Err(errors) = validate_payment_result(&result) {
        error!(order_id = %order_id, %errors, "Captured payment is missing details");
        return Err(CoreError::payment_mismatch(format!("incomplete capture: {errors}")).into());
    }

    let mut uow = state.db.begin().await?;
    let applied = apply_payment(state, &mut uow, order_id, &result).await;
    settle(uow, applied).await?;

    info!(order_id = %order_id, external_id = %result.id, paid = %result.price_paid, "Payment captured");

    state
        .db
        .orders()
        .get_by_id(order_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Order", order_id).into())
}

async fn capture_failed(state: &AppState, order_id: &str, err: PaymentError) -> ApiError {
    match state.db.orders().get_by_id(order_id).await {
        Ok(Some(order)) if order.is_paid => {
            warn!(order_id = %order_id, error = %err, "Capture refused; order paid by a concurrent confirmation");
            CoreError::AlreadyPaid(order_id.to_string()).into()
        }
        _ => err.into(),
    }
}

async fn apply_payment(
    state: &AppState,
    uow: &mut UnitOfWork,
    order_id: &str,
    result: &PaymentResult,
) -> ApiResult<()> {
    let items = state.db.orders().get_items_in(uow, order_id).await?;
    for item in &items {
        state
            .db
            .products()
            .decrement_stock(uow, &item.product_id, item.quantity)
            .await?;
    }

    let marked = state
        .db
        .orders()
        .mark_paid(uow, order_id, result, Utc::now())
        .await?;
    if !marked {
        warn!(order_id = %order_id, "Order was paid by a concurrent confirmation");
        return Err(CoreError::AlreadyPaid(order_id.to_string()).into());
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
