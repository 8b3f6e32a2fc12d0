//! Storefront API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! PayPal credentials have no default.

use std::env;

use storefront_core::{Money, PricingRules, TaxRate, LATEST_PRODUCTS_LIMIT};
use storefront_payments::SANDBOX_API_URL;

/// Storefront API configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Connection pool size
    pub db_max_connections: u32,

    /// PayPal REST root
    pub paypal_api_url: String,

    pub paypal_client_id: String,

    pub paypal_app_secret: String,

    /// Session cookie only sent over HTTPS
    pub session_cookie_secure: bool,

    /// How many products the home listing returns
    pub latest_products_limit: u32,

    /// Shipping threshold, flat fee and tax rate
    pub pricing: PricingRules,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = PricingRules::default();

        let config = AppConfig {
            port: parse_or(&lookup, "PORT", 3000)?,

            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "./storefront.db".to_string()),

            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,

            paypal_api_url: lookup("PAYPAL_API_URL").unwrap_or_else(|| SANDBOX_API_URL.to_string()),

            paypal_client_id: required(&lookup, "PAYPAL_CLIENT_ID")?,

            paypal_app_secret: required(&lookup, "PAYPAL_APP_SECRET")?,

            session_cookie_secure: parse_or(&lookup, "SESSION_COOKIE_SECURE", false)?,

            latest_products_limit: parse_or(&lookup, "LATEST_PRODUCTS_LIMIT", LATEST_PRODUCTS_LIMIT)?,

            pricing: PricingRules {
                free_shipping_threshold: parse_or::<Money>(
                    &lookup,
                    "FREE_SHIPPING_THRESHOLD",
                    defaults.free_shipping_threshold,
                )?,
                flat_shipping_fee: parse_or::<Money>(
                    &lookup,
                    "FLAT_SHIPPING_FEE",
                    defaults.flat_shipping_fee,
                )?,
                tax_rate: TaxRate::from_bps(parse_or(&lookup, "TAX_RATE_BPS", defaults.tax_rate.bps())?),
            },
        };

        if config.pricing.tax_rate.bps() > 10_000 {
            return Err(ConfigError::InvalidValue("TAX_RATE_BPS".to_string()));
        }

        Ok(config)
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingRequired(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const CREDENTIALS: [(&str, &str); 2] = [("PAYPAL_CLIENT_ID", "id"), ("PAYPAL_APP_SECRET", "secret")];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&CREDENTIALS)).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.database_path, "./storefront.db");
        assert_eq!(config.paypal_api_url, SANDBOX_API_URL);
        assert_eq!(config.latest_products_limit, 4);
        assert!(!config.session_cookie_secure);
        assert_eq!(config.pricing, PricingRules::default());
    }

    #[test]
    fn test_overrides() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("FREE_SHIPPING_THRESHOLD", "50.00"),
            ("FLAT_SHIPPING_FEE", "4.99"),
            ("TAX_RATE_BPS", "825"),
            ("SESSION_COOKIE_SECURE", "true"),
        ]);
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.pricing.free_shipping_threshold, Money::from_cents(5000));
        assert_eq!(config.pricing.flat_shipping_fee, Money::from_cents(499));
        assert_eq!(config.pricing.tax_rate.bps(), 825);
        assert!(config.session_cookie_secure);
    }

    #[test]
    fn test_missing_credentials() {
        let err = AppConfig::from_lookup(lookup_from(&[("PAYPAL_CLIENT_ID", "id")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(key) if key == "PAYPAL_APP_SECRET"));
    }

    #[test]
    fn test_invalid_amount() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("FLAT_SHIPPING_FEE", "10.005"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key) if key == "FLAT_SHIPPING_FEE"));
    }
}
