//! # Seed Data Generator
//!
//! Populates the database with a demo catalog and a demo shopper.
//!
//! ## Usage
//! ```bash
//! # Seed ./storefront_dev.db
//! cargo run -p storefront-db --bin seed
//!
//! # Specify database path
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db
//! ```
//!
//! ## Generated Data
//! - One product per (brand, style) pair, with slug `{brand}-{style}`
//! - Prices from 29.99 upward, stock 0 - 20 (some items sold out)
//! - Every third product featured
//! - User `demo@example.com` with no saved address or payment method

use chrono::{Duration, Utc};
use std::env;
use storefront_core::validation::validate_product;
use storefront_core::{Money, Product, User, UserRole};
use storefront_db::{Database, DbConfig};
use uuid::Uuid;

const BRANDS: &[&str] = &["Polo", "Brooks Brothers", "Tommy Hilfiger", "Calvin Klein", "Nike"];

/// (style, category, base price in cents)
const STYLES: &[(&str, &str, i64)] = &[
    ("Sporting Stretch Shirt", "Men's Dress Shirts", 5999),
    ("Classic Oxford Shirt", "Men's Dress Shirts", 6999),
    ("Slim Fit Polo", "Men's Polos", 2999),
    ("Long Sleeve Tee", "Men's Tees", 3499),
    ("Zip Hoodie", "Men's Sweatshirts", 7999),
    ("Quarter Zip Pullover", "Men's Sweatshirts", 8999),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./storefront_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./storefront_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Storefront Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    for (brand_idx, brand) in BRANDS.iter().enumerate() {
        for (style_idx, (style, category, base_price)) in STYLES.iter().enumerate() {
            let seed = brand_idx * STYLES.len() + style_idx;
            let product = generate_product(brand, style, category, *base_price, seed);

            if let Err(errors) = validate_product(&product) {
                eprintln!("Skipping {}: {}", product.slug, errors);
                continue;
            }
            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.slug, e);
                continue;
            }
            generated += 1;
        }
    }
    println!("✓ Generated {} products", generated);

    let demo = User {
        id: Uuid::new_v4().to_string(),
        name: "Demo Shopper".to_string(),
        email: "demo@example.com".to_string(),
        role: UserRole::User,
        address: None,
        payment_method: None,
        created_at: Utc::now(),
    };
    db.users().insert(&demo).await?;
    println!("✓ Created user {} ({})", demo.email, demo.id);

    let latest = db.products().list_latest(storefront_core::LATEST_PRODUCTS_LIMIT).await?;
    println!();
    println!("Latest products:");
    for product in latest {
        println!("  {} - {} ({} in stock)", product.slug, product.price, product.stock);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(brand: &str, style: &str, category: &str, base_price: i64, seed: usize) -> Product {
    let slug = format!("{}-{}", brand, style)
        .to_lowercase()
        .replace(' ', "-");

    Product {
        id: Uuid::new_v4().to_string(),
        name: format!("{} {}", brand, style),
        description: format!("{} from {}, made for everyday wear.", style, brand),
        images: vec![
            format!("/images/sample-products/{}-1.jpg", slug),
            format!("/images/sample-products/{}-2.jpg", slug),
        ],
        price: Money::from_cents(base_price + (seed as i64 % 4) * 500),
        stock: (seed as i64 * 7) % 21,
        rating: 3.5 + (seed % 4) as f64 * 0.5,
        num_reviews: (seed as i64 * 3) % 17,
        is_featured: seed % 3 == 0,
        banner: (seed % 3 == 0).then(|| format!("/images/banners/{}.jpg", slug)),
        created_at: Utc::now() - Duration::minutes(seed as i64),
        slug,
        category: category.to_string(),
        brand: brand.to_string(),
    }
}
