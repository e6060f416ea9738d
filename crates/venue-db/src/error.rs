//! # Database Error Types
//!
//! Error types for storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  venue-core rule violation        SQLite error (sqlx::Error)           │
//! │  (CoreError)                            │                               │
//! │       │                                 │ UNIQUE    → Conflict          │
//! │       │                                 │ RowNotFound → NotFound        │
//! │       ▼                                 ▼                               │
//! │  DbError::Domain(..)   ◄──────   DbError (this module)                 │
//! │       │                                 │ anything else → storage       │
//! │       ▼                                 ▼                               │
//! │  ApiError (venue-server) ← kind() picks the HTTP status                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use venue_core::{CoreError, ErrorKind, ValidationError};

/// Storage operation errors.
///
/// Domain failures travel inside [`DbError::Domain`] untouched, so callers
/// can match on the core taxonomy. Everything else is a storage failure.
#[derive(Debug, Error)]
pub enum DbError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Pool is closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    ///
    /// ## When This Occurs
    /// - SQL error not covered by a constraint mapping
    /// - Lock wait exceeded the busy timeout
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DbError::Domain(CoreError::not_found(entity, id))
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        DbError::Domain(CoreError::invalid_argument(msg))
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        DbError::Domain(CoreError::invalid_state(msg))
    }

    /// Stable classification; storage failures are [`ErrorKind::Storage`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Domain(err) => err.kind(),
            _ => ErrorKind::Storage,
        }
    }

    /// Whether this is a uniqueness violation on `table.column`.
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::Domain(CoreError::Conflict(msg)) if msg.contains(column))
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Domain(CoreError::Validation(err))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → Domain(NotFound)
/// UNIQUE constraint failed    → Domain(Conflict), message keeps table.column
/// FOREIGN KEY constraint      → Domain(InvalidArgument)
/// CHECK constraint failed     → Domain(InvalidArgument)
/// sqlx::Error::PoolTimedOut   → PoolExhausted
/// Other                       → QueryFailed / Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                //   "UNIQUE constraint failed: <table>.<column>"
                //   "FOREIGN KEY constraint failed"
                //   "CHECK constraint failed: <expr>"
                if let Some(target) = msg.split("UNIQUE constraint failed: ").nth(1) {
                    DbError::Domain(CoreError::conflict(format!("{target} already exists")))
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::invalid_argument("referenced record does not exist")
                } else if msg.contains("CHECK constraint failed") {
                    DbError::invalid_argument(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
