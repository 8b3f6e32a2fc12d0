//! # Storefront API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Browser ───► HTTP (3000) ───► Services ───► SQLite                    │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                              PayPal REST                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use storefront_api::session::{create_session_layer, session_store};
use storefront_api::{router, AppConfig, AppState};
use storefront_db::{Database, DbConfig};
use storefront_payments::{PayPalClient, PayPalConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("Starting storefront API server...");

    // Load configuration
    let config = AppConfig::load()?;
    info!(
        port = config.port,
        database = %config.database_path,
        paypal = %config.paypal_api_url,
        "Configuration loaded"
    );

    // Open database (runs migrations)
    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
    )
    .await?;

    let gateway = PayPalClient::new(PayPalConfig::new(
        config.paypal_api_url.clone(),
        config.paypal_client_id.clone(),
        config.paypal_app_secret.clone(),
    ));

    let state = AppState::new(db.clone(), Arc::new(gateway), config.pricing)
        .with_latest_products_limit(config.latest_products_limit);
    let sessions = create_session_layer(session_store(&db).await?, config.session_cookie_secure);
    let app = router(state, sessions);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
