//! # HTTP Handlers
//!
//! Thin axum wrappers over [`services`](crate::services).
//!
//! ## Routes
//! ```text
//! GET    /health                           health::health
//! GET    /api/products                     products::latest
//! GET    /api/products/{slug}              products::by_slug
//! GET    /api/cart                         cart::get_cart
//! POST   /api/cart/items                   cart::add_item
//! DELETE /api/cart/items/{product_id}      cart::remove_item
//! POST   /api/session/claim-cart           cart::claim
//! PUT    /api/user/shipping-address        checkout::update_shipping_address
//! PUT    /api/user/payment-method          checkout::update_payment_method
//! POST   /api/orders                       checkout::create_order
//! GET    /api/orders/{id}                  checkout::get_order
//! POST   /api/orders/{id}/paypal           payment::initiate
//! POST   /api/orders/{id}/paypal/capture   payment::confirm
//! ```

pub mod cart;
pub mod checkout;
pub mod health;
pub mod payment;
pub mod products;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::SqliteStore;

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState, sessions: SessionManagerLayer<SqliteStore>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/products", get(products::latest))
        .route("/api/products/{slug}", get(products::by_slug))
        .route("/api/cart", get(cart::get_cart))
        .route("/api/cart/items", post(cart::add_item))
        .route("/api/cart/items/{product_id}", delete(cart::remove_item))
        .route("/api/session/claim-cart", post(cart::claim))
        .route("/api/user/shipping-address", put(checkout::update_shipping_address))
        .route("/api/user/payment-method", put(checkout::update_payment_method))
        .route("/api/orders", post(checkout::create_order))
        .route("/api/orders/{id}", get(checkout::get_order))
        .route("/api/orders/{id}/paypal", post(payment::initiate))
        .route("/api/orders/{id}/paypal/capture", post(payment::confirm))
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Unit Tests
// =============================================================================
