//! # PayPal REST Client
//!
//! [`PaymentGateway`] over the PayPal Orders v2 API.
//!
//! ```text
//! ┌────────────────┐  POST /v1/oauth2/token            ┌──────────────┐
//! │  PayPalClient  │ ─────────────────────────────────►│              │
//! │                │  POST /v2/checkout/orders         │   PayPal     │
//! │                │ ─────────────────────────────────►│   REST API   │
//! │                │  POST /v2/checkout/orders/{id}/   │              │
//! │                │       capture                     │              │
//! └────────────────┘ ─────────────────────────────────►└──────────────┘
//! ```
//!
//! A fresh access token is requested for every call.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::Deserialize;
use storefront_core::Money;
use tracing::{debug, warn};

use crate::error::PaymentError;
use crate::gateway::{CaptureResult, PaymentGateway};

pub const SANDBOX_API_URL: &str = "https://api-m.sandbox.paypal.com";

/// Connection settings for the PayPal REST API.
#[derive(Debug, Clone)]
pub struct PayPalConfig {
    /// API root, e.g. [`SANDBOX_API_URL`]. No trailing slash.
    pub base_url: String,
    pub client_id: String,
    pub app_secret: String,
    /// ISO currency code sent with every order.
    pub currency: String,
}

impl PayPalConfig {
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        PayPalConfig {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            app_secret: app_secret.into(),
            currency: "USD".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PayPalClient {
    config: PayPalConfig,
    http: Client,
}

impl PayPalClient {
    #[must_use]
    pub fn new(config: PayPalConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn access_token(&self) -> Result<String, PaymentError> {
        let response = self
            .http
            .post(self.url("/v1/oauth2/token"))
            .basic_auth(&self.config.client_id, Some(&self.config.app_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await?;

        let parsed: TokenResponse = ensure_success(response).await?.json().await?;
        Ok(parsed.access_token)
    }
}

#[async_trait]
impl PaymentGateway for PayPalClient {
    async fn create_order(&self, amount: Money) -> Result<String, PaymentError> {
        let token = self.access_token().await?;

        let body = serde_json::json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": self.config.currency,
                    "value": amount.to_string(),
                }
            }]
        });

        let response = self
            .http
            .post(self.url("/v2/checkout/orders"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let parsed: OrderResponse = ensure_success(response).await?.json().await?;
        debug!(paypal_order = %parsed.id, amount = %amount, "PayPal order created");
        Ok(parsed.id)
    }

    async fn capture_payment(&self, external_order_id: &str) -> Result<CaptureResult, PaymentError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(self.url(&format!("/v2/checkout/orders/{external_order_id}/capture")))
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let parsed: CaptureResponse = ensure_success(response).await?.json().await?;
        let result = CaptureResult::try_from(parsed)?;
        debug!(paypal_order = %result.id, status = %result.status, "PayPal order captured");
        Ok(result)
    }
}

async fn ensure_success(response: Response) -> Result<Response, PaymentError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "PayPal request failed");
    Err(PaymentError::Api {
        status: status.as_u16(),
        body,
    })
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    id: String,
    status: String,
    #[serde(default)]
    payer: Option<Payer>,
    #[serde(default)]
    purchase_units: Vec<PurchaseUnit>,
}

#[derive(Debug, Deserialize)]
struct Payer {
    #[serde(default)]
    email_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PurchaseUnit {
    #[serde(default)]
    payments: Option<Payments>,
}

#[derive(Debug, Deserialize)]
struct Payments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
struct Capture {
    amount: Amount,
}

#[derive(Debug, Deserialize)]
struct Amount {
    value: String,
}

impl TryFrom<CaptureResponse> for CaptureResult {
    type Error = PaymentError;

    fn try_from(response: CaptureResponse) -> Result<Self, PaymentError> {
        let amount_paid = response
            .purchase_units
            .into_iter()
            .next()
            .and_then(|unit| unit.payments)
            .and_then(|payments| payments.captures.into_iter().next())
            .map(|capture| capture.amount.value)
            .ok_or_else(|| {
                PaymentError::UnexpectedResponse(format!(
                    "capture of {} carries no captured amount",
                    response.id
                ))
            })?;

        Ok(CaptureResult {
            id: response.id,
            status: response.status,
            payer_email: response
                .payer
                .and_then(|payer| payer.email_address)
                .unwrap_or_default(),
            amount_paid,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    const CAPTURE_FIXTURE: &str = r#"{
        "id": "5O190127TN364715T",
        "status": "COMPLETED",
        "payer": { "email_address": "buyer@example.com", "payer_id": "QYR5Z8XDVJNXQ" },
        "purchase_units": [{
            "reference_id": "default",
            "payments": {
                "captures": [{
                    "id": "3C679366HH908993F",
                    "status": "COMPLETED",
                    "amount": { "currency_code": "USD", "value": "96.25" }
                }]
            }
        }]
    }"#;

    #[test]
    fn test_capture_response_mapping() {
        let parsed: CaptureResponse = serde_json::from_str(CAPTURE_FIXTURE).unwrap();
        let result = CaptureResult::try_from(parsed).unwrap();

        assert_eq!(result.id, "5O190127TN364715T");
        assert!(result.is_completed());
        assert_eq!(result.payer_email, "buyer@example.com");
        assert_eq!(result.amount_paid, "96.25");
    }

    #[test]
    fn test_capture_without_amount_is_unexpected() {
        let parsed: CaptureResponse =
            serde_json::from_str(r#"{"id":"X1","status":"COMPLETED","purchase_units":[]}"#).unwrap();
        let err = CaptureResult::try_from(parsed).unwrap_err();
        assert!(matches!(err, PaymentError::UnexpectedResponse(_)));
    }

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = PayPalConfig::new("http://localhost:9000/", "id", "secret");
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.currency, "USD");
    }

    /// Serves a minimal stand-in for the PayPal endpoints and returns its base URL.
    async fn fake_paypal() -> String {
        async fn token(headers: HeaderMap, body: String) -> Result<Json<Value>, StatusCode> {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if !auth.starts_with("Basic ") || body != "grant_type=client_credentials" {
                return Err(StatusCode::UNAUTHORIZED);
            }
            Ok(Json(json!({ "access_token": "tok-1", "token_type": "Bearer" })))
        }

        async fn create(headers: HeaderMap, Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
            if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer tok-1") {
                return Err(StatusCode::UNAUTHORIZED);
            }
            if body["intent"] != "CAPTURE" || body["purchase_units"][0]["amount"]["value"] != "96.25" {
                return Err(StatusCode::UNPROCESSABLE_ENTITY);
            }
            Ok(Json(json!({ "id": "5O190127TN364715T", "status": "CREATED" })))
        }

        async fn capture(Path(id): Path<String>) -> Result<Json<Value>, (StatusCode, String)> {
            if id != "5O190127TN364715T" {
                return Err((StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND".to_string()));
            }
            Ok(Json(serde_json::from_str(CAPTURE_FIXTURE).unwrap()))
        }

        let app = Router::new()
            .route("/v1/oauth2/token", post(token))
            .route("/v2/checkout/orders", post(create))
            .route("/v2/checkout/orders/{id}/capture", post(capture));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_create_and_capture_against_fake_server() {
        let base = fake_paypal().await;
        let client = PayPalClient::new(PayPalConfig::new(base, "client", "secret"));

        let id = client.create_order(Money::from_cents(9625)).await.unwrap();
        assert_eq!(id, "5O190127TN364715T");

        let result = client.capture_payment(&id).await.unwrap();
        assert_eq!(result.id, id);
        assert_eq!(result.amount_paid, "96.25");
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let base = fake_paypal().await;
        let client = PayPalClient::new(PayPalConfig::new(base, "client", "secret"));

        let err = client.capture_payment("UNKNOWN").await.unwrap_err();
        match err {
            PaymentError::Api { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "RESOURCE_NOT_FOUND");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
