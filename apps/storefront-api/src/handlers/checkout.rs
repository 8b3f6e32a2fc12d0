//! Checkout endpoints: saved details and order placement.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use storefront_core::ShippingAddress;

use crate::error::{ActionResult, ApiResult};
use crate::identity::RequestIdentity;
use crate::services::checkout::{self as service, OrderDetails};
use crate::state::AppState;

/// `PUT /api/user/shipping-address`
pub async fn update_shipping_address(
    State(state): State<AppState>,
    RequestIdentity(identity): RequestIdentity,
    body: Result<Json<ShippingAddress>, JsonRejection>,
) -> ApiResult<Json<ActionResult>> {
    let Json(address) = body?;
    service::update_shipping_address(&state, &identity, &address).await?;
    Ok(Json(ActionResult::ok("User updated successfully")))
}

#[derive(Debug, Deserialize)]
pub struct PaymentMethodForm {
    #[serde(rename = "type")]
    pub kind: String,
}

/// `PUT /api/user/payment-method` with `{"type": "PayPal"}`
pub async fn update_payment_method(
    State(state): State<AppState>,
    RequestIdentity(identity): RequestIdentity,
    body: Result<Json<PaymentMethodForm>, JsonRejection>,
) -> ApiResult<Json<ActionResult>> {
    let Json(form) = body?;
    service::update_payment_method(&state, &identity, &form.kind).await?;
    Ok(Json(ActionResult::ok("User updated successfully")))
}

/// `POST /api/orders`: places an order or says where to go first.
pub async fn create_order(
    State(state): State<AppState>,
    RequestIdentity(identity): RequestIdentity,
) -> ApiResult<Json<ActionResult>> {
    let outcome = service::create_order(&state, &identity).await?;
    Ok(Json(outcome.into()))
}

/// `GET /api/orders/{id}`
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<OrderDetails>> {
    Ok(Json(service::get_order(&state, &order_id).await?))
}
