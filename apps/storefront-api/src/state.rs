//! Shared application state.

use std::sync::Arc;

use storefront_core::PricingRules;
use storefront_db::Database;
use storefront_payments::PaymentGateway;

/// Everything a handler needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub gateway: Arc<dyn PaymentGateway>,
    pub rules: PricingRules,
    pub latest_products_limit: u32,
}

impl AppState {
    pub fn new(db: Database, gateway: Arc<dyn PaymentGateway>, rules: PricingRules) -> Self {
        AppState {
            db,
            gateway,
            rules,
            latest_products_limit: storefront_core::LATEST_PRODUCTS_LIMIT,
        }
    }

    pub fn with_latest_products_limit(mut self, limit: u32) -> Self {
        self.latest_products_limit = limit;
        self
    }
}
