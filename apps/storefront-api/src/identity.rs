//! # Request Identity
//!
//! Reads who is calling from the request.
//!
//! ```text
//! x-user-id: u-42                   ──► Identity.user_id
//! x-session-cart-id: 3f2c...        ──► Identity.session_cart_id
//! session["sessionCartId"]          ──► (used when the header is absent;
//!                                        minted on first use)
//! ```
//!
//! The user id is set by the authentication layer in front of this server;
//! it is trusted as given. Browsers carry the cart id in their session
//! cookie. Other clients may send it as a header instead.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use storefront_core::Identity;
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::ApiError;
use crate::session::SESSION_CART_KEY;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const SESSION_CART_HEADER: &str = "x-session-cart-id";

/// Extractor wrapping the caller's [`Identity`].
///
/// Without the session layer (and without the header) the identity has no
/// session cart id.
#[derive(Debug, Clone)]
pub struct RequestIdentity(pub Identity);

impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let mut identity = identity_from_headers(&parts.headers);

        if identity.session_cart_id.is_none() {
            if let Some(session) = parts.extensions.get::<Session>() {
                identity.session_cart_id = Some(session_cart_id(session).await?);
            }
        }

        Ok(RequestIdentity(identity))
    }
}

pub fn identity_from_headers(headers: &HeaderMap) -> Identity {
    Identity {
        user_id: header_value(headers, USER_ID_HEADER),
        session_cart_id: header_value(headers, SESSION_CART_HEADER),
    }
}

/// The session's cart id, minted and stored when the session has none.
async fn session_cart_id(session: &Session) -> Result<String, ApiError> {
    let stored = session
        .get::<String>(SESSION_CART_KEY)
        .await
        .map_err(session_error)?;
    if let Some(id) = stored {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    session
        .insert(SESSION_CART_KEY, &id)
        .await
        .map_err(session_error)?;
    tracing::debug!(session_cart_id = %id, "Session cart id issued");
    Ok(id)
}

fn session_error(err: tower_sessions::session::Error) -> ApiError {
    tracing::error!("Session store failed: {}", err);
    ApiError::internal("Session unavailable")
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
