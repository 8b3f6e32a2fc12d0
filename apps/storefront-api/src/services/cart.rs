//! # Cart Service
//!
//! One persistent cart per shopper: keyed by user id when signed in, by
//! session cart id otherwise.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐  add_item   ┌──────────┐  create_order  ┌──────────┐      │
//! │  │ No Cart  │────────────►│ In Cart  │───────────────►│  Empty   │      │
//! │  └──────────┘             └──────────┘  (checkout)    └──────────┘      │
//! │                             │      ▲                                    │
//! │                 remove_item │      │ add_item                           │
//! │                             ▼      │                                    │
//! │                           (line drops at quantity 0)                    │
//! │                                                                         │
//! │  claim_session_cart: anonymous cart ──► user's cart (on sign-in)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock check reads the product, then writes the cart. Two shoppers can
//! both pass the check for the last unit.

use chrono::Utc;
use storefront_core::validation::validate_line_item;
use storefront_core::{Cart, CartChange, CoreError, Identity, LineItem, LineItemInput, Product};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::AppState;

/// Returns the caller's cart. A missing cart is not an error.
pub async fn get_cart(state: &AppState, identity: &Identity) -> ApiResult<Option<Cart>> {
    let Some(owner) = identity.cart_owner() else {
        return Ok(None);
    };
    Ok(state.db.carts().find(&owner).await?)
}

/// Adds one unit of the submitted product.
///
/// ## Order of Checks
/// 1. The caller has a session cart id
/// 2. The submitted line item is well-formed
/// 3. The product exists
/// 4. Stock covers the new quantity
///
/// The new line takes name, slug and price from the catalog; the submitted
/// image is used only when the product has none.
pub async fn add_item(
    state: &AppState,
    identity: &Identity,
    input: &LineItemInput,
) -> ApiResult<String> {
    let session_cart_id = identity
        .session_cart_id
        .as_deref()
        .ok_or_else(|| CoreError::not_found("Cart session", "none"))?;

    let item = validate_line_item(input)?;

    let product = state
        .db
        .products()
        .get_by_id(&item.product_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Product", &item.product_id))?;

    let existing = match identity.cart_owner() {
        Some(owner) => state.db.carts().find(&owner).await?,
        None => None,
    };

    let change = match existing {
        None => {
            let mut cart = Cart::new(
                Uuid::new_v4().to_string(),
                session_cart_id,
                identity.user_id.clone(),
                Utc::now(),
            );
            let change = add_checked(&mut cart, &product, &item, state)?;
            state.db.carts().insert(&cart).await?;
            info!(cart_id = %cart.id, product_id = %product.id, "Cart created");
            change
        }
        Some(mut cart) => {
            let change = add_checked(&mut cart, &product, &item, state)?;
            state.db.carts().save(&cart).await?;
            debug!(cart_id = %cart.id, product_id = %product.id, quantity = cart.quantity_of(&product.id), "Cart updated");
            change
        }
    };

    Ok(match change {
        CartChange::Added => format!("{} added to cart", product.name),
        CartChange::Updated => format!("{} updated in cart", product.name),
    })
}

fn add_checked(
    cart: &mut Cart,
    product: &Product,
    item: &LineItem,
    state: &AppState,
) -> ApiResult<CartChange> {
    cart.add_product(product, &item.image, &state.rules)
        .inspect_err(|e| warn!(cart_id = %cart.id, error = %e, "Add to cart rejected"))
        .map_err(Into::into)
}

/// Removes one unit of a product from the caller's cart.
pub async fn remove_item(state: &AppState, identity: &Identity, product_id: &str) -> ApiResult<String> {
    let owner = identity
        .cart_owner()
        .ok_or_else(|| CoreError::not_found("Cart", "none"))?;

    let mut cart = state
        .db
        .carts()
        .find(&owner)
        .await?
        .ok_or_else(|| CoreError::not_found("Cart", "none"))?;

    let removed = cart.remove_one(product_id, &state.rules)?;
    state.db.carts().save(&cart).await?;

    debug!(cart_id = %cart.id, product_id = %product_id, "Removed one unit");
    Ok(format!("{} was removed from cart", removed.name))
}

/// Hands the anonymous session cart to a user who has just signed in.
///
/// Returns `true` when the cart changed hands. A user who already owns a
/// cart keeps it, and the session cart is left alone.
pub async fn claim_session_cart(
    state: &AppState,
    session_cart_id: &str,
    user_id: &str,
) -> ApiResult<bool> {
    if state.db.users().get_by_id(user_id).await?.is_none() {
        return Err(CoreError::not_found("User", user_id).into());
    }

    if state.db.carts().find_by_user(user_id).await?.is_some() {
        debug!(user_id = %user_id, "User already has a cart; nothing to claim");
        return Ok(false);
    }

    let Some(cart) = state.db.carts().find_by_session(session_cart_id).await? else {
        return Ok(false);
    };

    let claimed = state.db.carts().assign_to_user(&cart.id, user_id).await?;
    if claimed {
        info!(cart_id = %cart.id, user_id = %user_id, "Session cart claimed");
    }
    Ok(claimed)
}

// =============================================================================
// Unit Tests
// =============================================================================
