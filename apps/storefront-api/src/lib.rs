//! # Storefront API
//!
//! HTTP server for the storefront: carts, checkout and PayPal payments.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storefront API                                  │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  handlers      │  │  services      │  │  infrastructure            ││
//! │  │                │  │                │  │                            ││
//! │  │ • products     │─►│ • cart         │─►│ • storefront-db (SQLite)   ││
//! │  │ • cart         │  │ • checkout     │  │ • storefront-payments      ││
//! │  │ • checkout     │  │ • payment      │  │   (PayPal REST)            ││
//! │  │ • payment      │  │                │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │          ▲                                                              │
//! │  identity: x-user-id header + session cart id (tower-sessions)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `PORT` - HTTP port (default: 3000)
//! - `DATABASE_PATH` - SQLite file (default: ./storefront.db)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `PAYPAL_API_URL` - PayPal REST root (default: sandbox)
//! - `PAYPAL_CLIENT_ID`, `PAYPAL_APP_SECRET` - PayPal credentials (required)
//! - `SESSION_COOKIE_SECURE` - HTTPS-only session cookie (default: false)
//! - `LATEST_PRODUCTS_LIMIT` - home page listing size (default: 4)
//! - `FREE_SHIPPING_THRESHOLD` - default 100.00
//! - `FLAT_SHIPPING_FEE` - default 10.00
//! - `TAX_RATE_BPS` - tax rate in basis points (default: 1500)

pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod services;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_support;

// Re-exports
pub use config::{AppConfig, ConfigError};
pub use error::{ActionResult, ApiError, ApiResult, ErrorCode};
pub use handlers::router;
pub use state::AppState;
