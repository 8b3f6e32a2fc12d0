//! Session middleware configuration.
//!
//! Sessions live in the storefront's SQLite database through
//! tower-sessions. The only value stored today is the anonymous cart id,
//! minted by [`RequestIdentity`](crate::identity::RequestIdentity) on the
//! first request that needs one.

use storefront_db::{Database, DbResult};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "storefront_session";

/// Session key holding the anonymous cart id.
pub const SESSION_CART_KEY: &str = "sessionCartId";

/// Session expiry time in seconds (30 days).
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Opens the session store, creating its table when missing.
pub async fn session_store(db: &Database) -> DbResult<SqliteStore> {
    let store = SqliteStore::new(db.pool().clone());
    store.migrate().await?;
    Ok(store)
}

/// Create the session layer over `store`.
///
/// `secure` marks the cookie HTTPS-only.
#[must_use]
pub fn create_session_layer(store: SqliteStore, secure: bool) -> SessionManagerLayer<SqliteStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
