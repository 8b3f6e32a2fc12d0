//! Fixtures shared by the service and handler tests.

use std::sync::Arc;

use chrono::Utc;
use storefront_core::{
    LineItem, LineItemInput, Money, PaymentMethod, PricingRules, Product, ShippingAddress, User, UserRole,
};
use storefront_db::{Database, DbConfig};
use storefront_payments::MockPaymentGateway;

use crate::handlers::router;
use crate::session::{create_session_layer, session_store};
use crate::state::AppState;

pub async fn test_state(gateway: MockPaymentGateway) -> AppState {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");
    AppState::new(db, Arc::new(gateway), PricingRules::default())
}

/// The full router, sessions included, over `state`.
pub async fn test_app(state: AppState) -> axum::Router {
    let store = session_store(&state.db).await.expect("session store");
    router(state, create_session_layer(store, false))
}

/// A gateway that fails the test if it is called at all.
pub fn idle_gateway() -> MockPaymentGateway {
    MockPaymentGateway::new()
}

pub async fn seed_product(state: &AppState, id: &str, price_cents: i64, stock: i64) -> Product {
    let product = Product {
        id: id.to_string(),
        name: format!("Shirt {id}"),
        slug: format!("shirt-{id}"),
        category: "Men's Dress Shirts".to_string(),
        brand: "Polo".to_string(),
        description: "Classic fit".to_string(),
        images: vec![format!("/images/shirt-{id}-1.jpg")],
        price: Money::from_cents(price_cents),
        stock,
        rating: 4.5,
        num_reviews: 3,
        is_featured: false,
        banner: None,
        created_at: Utc::now(),
    };
    state.db.products().insert(&product).await.expect("insert product");
    product
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Jane Shopper".to_string(),
        street_address: "123 Main St".to_string(),
        city: "Springfield".to_string(),
        postal_code: "12345".to_string(),
        country: "USA".to_string(),
        lat: None,
        lng: None,
    }
}

/// Inserts a user; `ready` users already have an address and payment method.
pub async fn seed_user(state: &AppState, id: &str, ready: bool) -> User {
    let user = User {
        id: id.to_string(),
        name: "Jane Shopper".to_string(),
        email: format!("{id}@example.com"),
        role: UserRole::User,
        address: ready.then(address),
        payment_method: ready.then_some(PaymentMethod::PayPal),
        created_at: Utc::now(),
    };
    state.db.users().insert(&user).await.expect("insert user");
    user
}

/// The line item a storefront page would submit for `product`.
pub fn line_for(product: &Product) -> LineItemInput {
    LineItemInput::from(&LineItem::from_product(product, storefront_core::PLACEHOLDER_IMAGE))
}
