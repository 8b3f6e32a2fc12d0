//! # Services
//!
//! The storefront operations, independent of HTTP.
//!
//! ```text
//! handlers ──► services::cart      get_cart / add_item / remove_item / claim_session_cart
//!          ──► services::checkout  create_order / update_* / get_order
//!          ──► services::payment   initiate_payment / confirm_payment
//! ```
//!
//! Each operation takes the [`AppState`](crate::state::AppState) and an
//! explicit [`Identity`](storefront_core::Identity) where the caller matters.

pub mod cart;
pub mod checkout;
pub mod payment;

use storefront_db::UnitOfWork;
use tracing::error;

use crate::error::ApiResult;

/// Commits `uow` when `outcome` succeeded, rolls it back otherwise.
pub(crate) async fn settle<T>(uow: UnitOfWork, outcome: ApiResult<T>) -> ApiResult<T> {
    match outcome {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = uow.rollback().await {
                error!(error = %rollback, "Rollback failed");
            }
            Err(err)
        }
    }
}
