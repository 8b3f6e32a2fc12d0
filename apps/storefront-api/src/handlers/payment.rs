//! PayPal endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use storefront_core::Order;

use crate::error::ApiResult;
use crate::services::payment as service;
use crate::state::AppState;

/// Success body carrying a payload.
#[derive(Debug, Serialize)]
pub struct DataResult<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

/// `POST /api/orders/{id}/paypal`: returns the gateway order id to approve.
pub async fn initiate(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<DataResult<String>>> {
    let external_id = service::initiate_payment(&state, &order_id).await?;
    Ok(Json(DataResult {
        success: true,
        message: "PayPal order created successfully".to_string(),
        data: external_id,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    /// The approved gateway order; PayPal's JS SDK calls it `orderID`.
    #[serde(alias = "orderID")]
    pub external_order_id: String,
}

/// `POST /api/orders/{id}/paypal/capture`
pub async fn confirm(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    body: Result<Json<CaptureRequest>, JsonRejection>,
) -> ApiResult<Json<DataResult<Order>>> {
    let Json(request) = body?;
    let order = service::confirm_payment(&state, &order_id, &request.external_order_id).await?;
    Ok(Json(DataResult {
        success: true,
        message: "Your order has been paid".to_string(),
        data: order,
    }))
}
