//! # Payment Gateway
//!
//! The seam between the storefront and whoever moves the money.
//!
//! ```text
//! initiate_payment ──► create_order(total) ──► external order id
//!                                                   │
//!                                  shopper approves at the gateway
//!                                                   │
//! confirm_payment ───► capture_payment(id) ──► CaptureResult
//! ```

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use storefront_core::Money;

use crate::error::PaymentError;

/// What the gateway reports after a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResult {
    /// The gateway's order id; must match the one being captured.
    pub id: String,
    /// `COMPLETED` on success.
    pub status: String,
    pub payer_email: String,
    /// Captured amount as the gateway reports it, e.g. `"96.25"`.
    pub amount_paid: String,
}

impl CaptureResult {
    pub const COMPLETED: &'static str = "COMPLETED";

    pub fn is_completed(&self) -> bool {
        self.status == Self::COMPLETED
    }
}

/// A payment gateway that can create and capture orders.
///
/// Failures are final: callers never retry automatically.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a gateway order for `amount` and returns its id.
    async fn create_order(&self, amount: Money) -> Result<String, PaymentError>;

    /// Captures a previously approved gateway order.
    async fn capture_payment(&self, external_order_id: &str) -> Result<CaptureResult, PaymentError>;
}
