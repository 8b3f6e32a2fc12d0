//! Cart endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use storefront_core::{Cart, CoreError, LineItemInput};

use crate::error::{ActionResult, ApiResult};
use crate::identity::RequestIdentity;
use crate::services::cart as service;
use crate::state::AppState;

/// `GET /api/cart`: the cart, or `null` when there is none yet.
pub async fn get_cart(
    State(state): State<AppState>,
    RequestIdentity(identity): RequestIdentity,
) -> ApiResult<Json<Option<Cart>>> {
    Ok(Json(service::get_cart(&state, &identity).await?))
}

/// `POST /api/cart/items`
///
/// Price and quantity are checked by the service, so a bad value comes back
/// in the same field list as the rest.
pub async fn add_item(
    State(state): State<AppState>,
    RequestIdentity(identity): RequestIdentity,
    body: Result<Json<LineItemInput>, JsonRejection>,
) -> ApiResult<Json<ActionResult>> {
    let Json(item) = body?;
    let message = service::add_item(&state, &identity, &item).await?;
    Ok(Json(ActionResult::ok(message)))
}

/// `DELETE /api/cart/items/{product_id}`
pub async fn remove_item(
    State(state): State<AppState>,
    RequestIdentity(identity): RequestIdentity,
    Path(product_id): Path<String>,
) -> ApiResult<Json<ActionResult>> {
    let message = service::remove_item(&state, &identity, &product_id).await?;
    Ok(Json(ActionResult::ok(message)))
}

/// `POST /api/session/claim-cart`: called by the sign-in flow.
pub async fn claim(
    State(state): State<AppState>,
    RequestIdentity(identity): RequestIdentity,
) -> ApiResult<Json<ActionResult>> {
    let user_id = identity.user_id.as_deref().ok_or(CoreError::Unauthenticated)?;
    let session_cart_id = identity
        .session_cart_id
        .as_deref()
        .ok_or_else(|| CoreError::not_found("Cart session", "none"))?;

    let claimed = service::claim_session_cart(&state, session_cart_id, user_id).await?;
    Ok(Json(ActionResult::ok(if claimed {
        "Cart moved to your account"
    } else {
        "No cart to move"
    })))
}
