//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError          - Business rule failures                       │
//! │  ├── ValidationErrors   - Every offending field of one input           │
//! │  └── ValidationError    - One offending field                          │
//! │                                                                         │
//! │  storefront-db          └── DbError       - Database failures          │
//! │  storefront-payments    └── PaymentError  - Gateway failures           │
//! │                                                                         │
//! │  storefront-api         └── ApiError      - What the caller sees       │
//! │                                                                         │
//! │  Flow: ValidationErrors → CoreError ──┐                                 │
//! │        DbError ───────────────────────┼──► ApiError → JSON response     │
//! │        PaymentError ──────────────────┘                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced record does not exist.
    ///
    /// ## When This Occurs
    /// - Adding to cart without a session cart id
    /// - Adding a product that is not in the catalog
    /// - Removing from a cart that does not exist, or a product not in it
    /// - Paying for an unknown order
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The prospective quantity exceeds stock on hand.
    ///
    /// ```text
    /// cart holds 5, stock is 5
    ///      │
    ///      ▼  add_item
    /// InsufficientStock { product: "Polo", available: 5, requested: 6 }
    /// ```
    #[error("Not enough stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// The gateway's answer does not match the order being confirmed.
    #[error("Payment mismatch: {reason}")]
    PaymentMismatch { reason: String },

    /// The order is already paid; payment is terminal.
    #[error("Order {0} is already paid")]
    AlreadyPaid(String),

    /// The operation requires a signed-in user.
    #[error("User is not authenticated")]
    Unauthenticated,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

impl CoreError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn payment_mismatch(reason: impl Into<String>) -> Self {
        CoreError::PaymentMismatch {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must not be negative")]
    Negative { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// The field this error is about.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

/// Every field of one input that failed validation.
///
/// Validators collect all failures rather than stopping at the first,
/// so a caller can highlight every bad field at once.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Returns `Ok(())` if nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors(vec![error])
    }
}

impl From<ValidationError> for CoreError {
    fn from(error: ValidationError) -> Self {
        CoreError::Validation(error.into())
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Polo Shirt".to_string(),
            available: 5,
            requested: 6,
        };
        assert_eq!(
            err.to_string(),
            "Not enough stock for Polo Shirt: available 5, requested 6"
        );
        assert_eq!(
            CoreError::not_found("Cart", "abc").to_string(),
            "Cart not found: abc"
        );
    }

    #[test]
    fn test_validation_errors_join() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::Required {
            field: "name".to_string(),
        });
        errors.push(ValidationError::TooShort {
            field: "city".to_string(),
            min: 3,
        });
        assert_eq!(
            errors.to_string(),
            "name is required; city must be at least 3 characters"
        );
        assert_eq!(errors.errors()[1].field(), "city");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let err: CoreError = ValidationError::Required {
            field: "slug".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Validation(ref e) if e.errors().len() == 1));
    }
}
