//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service (storefront-api)                                               │
//! │       │                                                                 │
//! │       │  db.carts().find(&owner)                                        │
//! │       ▼                                                                 │
//! │  CartRepository                                                         │
//! │  ├── reads/writes on the pool                                           │
//! │  └── multi-step writes on a &mut UnitOfWork                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository maps a raw `sqlx::FromRow` row type to the domain type
//! from `storefront-core`, decoding JSON columns on the way.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog lookups and stock
//! - [`CartRepository`](cart::CartRepository) - Carts by user or session
//! - [`OrderRepository`](order::OrderRepository) - Orders, items and payment state
//! - [`UserRepository`](user::UserRepository) - Saved checkout details

pub mod cart;
pub mod order;
pub mod product;
pub mod user;
