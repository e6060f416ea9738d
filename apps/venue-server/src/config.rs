//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

/// Used when `VENUE_JWT_SECRET` is unset. Fine for a laptop, never for a venue.
pub const DEV_JWT_SECRET: &str = "venue-pos-dev-secret-change-in-production";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Interface to bind
    pub bind_addr: IpAddr,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Connection pool size
    pub db_max_connections: u32,

    /// Secret shared with the identity service that signs bearer tokens
    pub jwt_secret: String,

    /// True when `jwt_secret` fell back to [`DEV_JWT_SECRET`]
    pub jwt_secret_defaulted: bool,

    /// Report window when a request gives no start date
    pub report_default_days: i64,

    /// Order events buffered per WebSocket subscriber before it lags
    pub event_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            http_port: 5000,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            db_path: PathBuf::from("./venue_pos.db"),
            db_max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_secret_defaulted: true,
            report_default_days: 30,
            event_buffer: 256,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();
        let jwt_secret = lookup("VENUE_JWT_SECRET").filter(|s| !s.trim().is_empty());

        let config = ServerConfig {
            http_port: parse_or(&lookup, "VENUE_HTTP_PORT", defaults.http_port)?,
            bind_addr: parse_or(&lookup, "VENUE_BIND_ADDR", defaults.bind_addr)?,
            db_path: lookup("VENUE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            db_max_connections: parse_or(
                &lookup,
                "VENUE_DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,
            jwt_secret_defaulted: jwt_secret.is_none(),
            jwt_secret: jwt_secret.unwrap_or(defaults.jwt_secret),
            report_default_days: parse_or(
                &lookup,
                "VENUE_REPORT_DEFAULT_DAYS",
                defaults.report_default_days,
            )?,
            event_buffer: parse_or(&lookup, "VENUE_EVENT_BUFFER", defaults.event_buffer)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("VENUE_DB_MAX_CONNECTIONS".to_string()));
        }
        if self.report_default_days <= 0 {
            return Err(ConfigError::InvalidValue("VENUE_REPORT_DEFAULT_DAYS".to_string()));
        }
        if self.event_buffer == 0 {
            return Err(ConfigError::InvalidValue("VENUE_EVENT_BUFFER".to_string()));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
