//! # storefront-payments
//!
//! Payment gateway boundary for the storefront.
//!
//! ## Module Structure
//! ```text
//! storefront_payments
//! ├── gateway  - PaymentGateway trait (+ MockPaymentGateway), CaptureResult
//! ├── paypal   - PayPal REST implementation
//! └── error    - PaymentError
//! ```
//!
//! Services depend on `Arc<dyn PaymentGateway>` so tests can swap in the mock.

pub mod error;
pub mod gateway;
pub mod paypal;

pub use error::PaymentError;
pub use gateway::{CaptureResult, MockPaymentGateway, PaymentGateway};
pub use paypal::{PayPalClient, PayPalConfig, SANDBOX_API_URL};
