//! # Mercato Portal API
//!
//! REST server for the wholesale ordering portal.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Portal API Server                                │
//! │                                                                         │
//! │  Clients ───► HTTP (3000) ───► Handlers ───► SQLite                    │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                               SMTP relay                                │
//! │                         (order notification)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod api;
mod auth;
mod config;
mod error;
mod services;
mod state;

use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::PortalConfig;
use crate::services::notifier::OrderNotifier;
use crate::state::AppState;
use mercato_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Mercato portal API server...");

    // Load configuration
    let config = PortalConfig::load()?;
    info!(
        port = config.http_port,
        db_path = %config.database_path,
        notification = config.mail.is_some(),
        "Configuration loaded"
    );

    // Connect to the database (runs migrations)
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Connected to SQLite");

    // First-run bootstrap: without any account nobody can log in
    bootstrap_admin(&db).await?;

    // Build the notifier when a relay is configured; the portal runs
    // without one, just silently (notification is best-effort)
    let notifier = match &config.mail {
        Some(mail) => match OrderNotifier::new(mail) {
            Ok(notifier) => Some(notifier),
            Err(e) => {
                warn!(error = %e, "Mail relay unavailable, continuing without notification");
                None
            }
        },
        None => None,
    };

    // Create shared state and the router
    let state = AppState::new(db, &config, notifier);
    let app = api::router(state);

    // Start server
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Creates the first administrator account when the accounts table is
/// empty, from `ADMIN_USERNAME`/`ADMIN_PASSWORD`.
///
/// Regular accounts are then managed through the admin panel.
async fn bootstrap_admin(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    if db.accounts().count().await? > 0 {
        return Ok(());
    }

    let (Ok(username), Ok(password)) = (
        std::env::var("ADMIN_USERNAME"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        warn!(
            "No accounts exist and ADMIN_USERNAME/ADMIN_PASSWORD are unset; \
             logins will fail until an administrator is created"
        );
        return Ok(());
    };

    let account = mercato_core::Account {
        id: mercato_db::repository::account::generate_account_id(),
        username,
        password_hash: auth::hash_password(&password)?,
        tier: mercato_core::PriceTier::A,
        company_name: "Administrator".to_string(),
        address: None,
        contact_number: None,
        email: None,
        is_admin: true,
        created_at: chrono::Utc::now(),
    };
    db.accounts().insert(&account).await?;

    info!(username = %account.username, "Bootstrap administrator account created");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
