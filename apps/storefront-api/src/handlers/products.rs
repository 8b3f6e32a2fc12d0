//! Catalog reads.

use axum::extract::{Path, State};
use axum::Json;
use storefront_core::{CoreError, Product};
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /api/products`: newest products first.
pub async fn latest(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    let products = state
        .db
        .products()
        .list_latest(state.latest_products_limit)
        .await?;
    debug!(count = products.len(), "Latest products");
    Ok(Json(products))
}

/// `GET /api/products/{slug}`
pub async fn by_slug(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Json<Product>> {
    let product = state
        .db
        .products()
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| CoreError::not_found("Product", &slug))?;
    Ok(Json(product))
}
