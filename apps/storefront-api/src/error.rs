//! # API Error Type
//!
//! Unified error type for HTTP handlers and services.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Service Function ── Result<T, ApiError>                               │
//! │         │                                                               │
//! │         ├── DbError       (storefront-db)        ──┐                   │
//! │         ├── CoreError     (storefront-core)      ──┼──► ApiError        │
//! │         └── PaymentError  (storefront-payments)  ──┘       │            │
//! │                                                            ▼            │
//! │                                     { "success": false,                │
//! │                                       "code": "INSUFFICIENT_STOCK",    │
//! │                                       "message": "Not enough ..." }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Expected failures keep their message. Database, gateway and internal
//! failures are logged and replaced by a generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use storefront_core::{CoreError, ValidationError, ValidationErrors};
use storefront_db::DbError;
use storefront_payments::PaymentError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned from services and handlers.
///
/// ## Serialization
/// ```json
/// {
///   "success": false,
///   "code": "NOT_FOUND",
///   "message": "Product not found: p-123"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Every offending field, for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Not enough stock for the requested quantity (409)
    InsufficientStock,

    /// Gateway answer does not match the order (422)
    PaymentMismatch,

    /// Order already paid (409)
    AlreadyPaid,

    /// No signed-in user (401)
    Unauthenticated,

    /// Database operation failed (500)
    DatabaseError,

    /// Payment gateway unreachable or refused (502)
    PaymentGateway,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::InsufficientStock | ErrorCode::AlreadyPaid => StatusCode::CONFLICT,
            ErrorCode::PaymentMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::PaymentGateway => StatusCode::BAD_GATEWAY,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            errors: None,
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            other => {
                tracing::error!("Database operation failed: {}", other);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::PaymentMismatch { .. } => ErrorCode::PaymentMismatch,
            CoreError::AlreadyPaid(_) => ErrorCode::AlreadyPaid,
            CoreError::Unauthenticated => ErrorCode::Unauthenticated,
            CoreError::Validation(errors) => {
                return ApiError {
                    code: ErrorCode::ValidationError,
                    message: err.to_string(),
                    errors: Some(errors.clone()),
                }
            }
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::from(errors).into()
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ValidationErrors::from(error).into()
    }
}

/// Malformed or mistyped JSON bodies are validation failures.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected request body");
        ApiError::new(ErrorCode::ValidationError, rejection.body_text())
    }
}

/// Converts gateway errors to API errors.
impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        tracing::error!("Payment gateway request failed: {}", err);
        ApiError::new(ErrorCode::PaymentGateway, "Payment gateway request failed")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "success": false,
            "code": self.code,
            "message": self.message,
            "errors": self.errors,
        });
        (self.code.status(), Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Action Results
// =============================================================================

/// Outcome of a state-changing action.
///
/// Redirects are ordinary outcomes: `success` is `false` and `redirect_to`
/// names the page that collects the missing input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        ActionResult {
            success: true,
            message: message.into(),
            redirect_to: None,
        }
    }

    pub fn ok_then(message: impl Into<String>, to: impl Into<String>) -> Self {
        ActionResult {
            success: true,
            message: message.into(),
            redirect_to: Some(to.into()),
        }
    }

    pub fn redirect(message: impl Into<String>, to: impl Into<String>) -> Self {
        ActionResult {
            success: false,
            message: message.into(),
            redirect_to: Some(to.into()),
        }
    }
}
