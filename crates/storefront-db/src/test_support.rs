//! Fixtures shared by the repository tests.

use chrono::Utc;
use storefront_core::{Money, Product, ShippingAddress, User, UserRole};

use crate::{Database, DbConfig};

pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

pub fn product(id: &str, slug: &str, price_cents: i64, stock: i64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {id}"),
        slug: slug.to_string(),
        category: "Men's Dress Shirts".to_string(),
        brand: "Polo".to_string(),
        description: "Classic fit".to_string(),
        images: vec![format!("/images/{slug}-1.jpg")],
        price: Money::from_cents(price_cents),
        stock,
        rating: 4.5,
        num_reviews: 10,
        is_featured: false,
        banner: None,
        created_at: Utc::now(),
    }
}

pub fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        name: "Jane Shopper".to_string(),
        email: format!("{id}@example.com"),
        role: UserRole::User,
        address: None,
        payment_method: None,
        created_at: Utc::now(),
    }
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
