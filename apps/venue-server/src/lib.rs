//! # Venue Server
//!
//! HTTP API over the venue-db engines, plus the live order feed.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Venue Server                                  │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /api/orders   │  │ /api/transfers │  │  /api/tables               ││
//! │  │                │  │                │  │  /api/items                ││
//! │  │ • create       │  │ • create       │  │  /api/locations            ││
//! │  │ • status       │  │ • complete     │  │                            ││
//! │  │ • payment      │  │ • cancel       │  │ registries + stock edits   ││
//! │  └───────┬────────┘  └────────────────┘  └────────────────────────────┘│
//! │          │ OrderEvent                                                   │
//! │  ┌───────▼────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Notifier      │  │ /api/reports   │  │  Auth                      ││
//! │  │  → /ws         │  │ sales, summary │  │  Bearer JWT → Actor        ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `VENUE_HTTP_PORT` - HTTP port (default: 5000)
//! - `VENUE_BIND_ADDR` - Bind address (default: 0.0.0.0)
//! - `VENUE_DB_PATH` - SQLite file (default: ./venue_pos.db)
//! - `VENUE_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `VENUE_JWT_SECRET` - Secret for verifying bearer tokens
//! - `VENUE_REPORT_DEFAULT_DAYS` - Report window without a start date (default: 30)
//! - `VENUE_EVENT_BUFFER` - Order events buffered per feed subscriber (default: 256)

pub mod auth;
pub mod config;
pub mod error;
pub mod notify;
pub mod routes;

use std::sync::Arc;

use venue_db::Database;

// Re-exports
pub use auth::{Authenticated, JwtManager};
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use notify::Notifier;
pub use routes::router;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub notifier: Notifier,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        AppState {
            db,
            notifier: Notifier::new(config.event_buffer),
            jwt: Arc::new(JwtManager::new(&config.jwt_secret)),
            config: Arc::new(config),
        }
    }
}
