//! # Venue Server
//!
//! HTTP API and live order feed for the venue POS.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Venue Server                                   │
//! │                                                                         │
//! │  Tablets / tills ───► HTTP (5000) ───► Engines ───► SQLite             │
//! │                                          │                              │
//! │                                          ▼                              │
//! │  Floor screens ◄──── /ws ◄──────── Notifier                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use venue_db::{Database, DbConfig};
use venue_server::{router, AppState, ServerConfig};

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,venue=debug,sqlx=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting venue server...");

    // Load configuration
    let config = ServerConfig::load().context("loading configuration")?;
    if config.jwt_secret_defaulted {
        warn!("VENUE_JWT_SECRET not set, using the development secret");
    }
    info!(
        addr = %config.socket_addr(),
        db_path = %config.db_path.display(),
        "Configuration loaded"
    );

    // Open the database and apply migrations
    let db = Database::new(
        DbConfig::new(&config.db_path).max_connections(config.db_max_connections),
    )
    .await
    .context("opening database")?;

    let addr = config.socket_addr();
    let app = router(AppState::new(db.clone(), config));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(?e, "Failed to listen for Ctrl+C");
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
                error!(?e, "Failed to install SIGTERM handler");
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
