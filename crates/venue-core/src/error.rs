//! # Error Types
//!
//! Domain error taxonomy for venue-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  venue-core errors (this file)                                         │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  ├── ValidationError  - Malformed input                                │
//! │  └── ErrorKind        - Stable machine-readable classification         │
//! │                                                                         │
//! │  venue-db errors (separate crate)                                      │
//! │  └── DbError          - Domain(CoreError) + storage failures           │
//! │                                                                         │
//! │  venue-server errors                                                   │
//! │  └── ApiError         - { code, message } JSON + HTTP status           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (entity, ID, quantities)
//! 3. Every error has a stable [`ErrorKind`]; the HTTP layer maps kinds, not messages

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised by the engines and the policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A referenced order, item, location, table, transfer or staff member
    /// does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Malformed or contradictory input.
    ///
    /// ## When This Occurs
    /// - Takeaway order carrying a table, dine-in order without one
    /// - Marking paid without a payment method
    /// - M-Pesa payment without a reference
    /// - Transfer from a destination-only location
    #[error("{0}")]
    InvalidArgument(String),

    /// The requested transition is not reachable from the current state.
    ///
    /// ## User Workflow
    /// ```text
    /// Order ORD-1 is completed
    ///      │
    ///      ▼
    /// PATCH status=preparing
    ///      │
    ///      ▼
    /// InvalidState: "order ORD-1 is completed, cannot move to preparing"
    /// ```
    #[error("{0}")]
    InvalidState(String),

    /// Transfer quantity exceeds what the source counter holds.
    #[error("Insufficient stock for item {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        available: i64,
        requested: i64,
    },

    /// Uniqueness violation (duplicate SKU, location name, table number...).
    #[error("{0}")]
    Conflict(String),

    /// The actor's role or ownership does not allow the action.
    #[error("{0}")]
    PermissionDenied(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        CoreError::InvalidArgument(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        CoreError::InvalidState(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        CoreError::Conflict(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        CoreError::PermissionDenied(msg.into())
    }

    /// Stable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::InvalidArgument(_) | CoreError::Validation(_) => ErrorKind::InvalidArgument,
            CoreError::InvalidState(_) => ErrorKind::InvalidState,
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CoreError::Conflict(_) => ErrorKind::Conflict,
            CoreError::PermissionDenied(_) => ErrorKind::PermissionDenied,
        }
    }
}

// =============================================================================
// Error Kind
// =============================================================================

/// Machine-readable error classification carried to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InvalidState,
    InsufficientStock,
    Conflict,
    PermissionDenied,
    /// Storage failure below the domain (never produced by venue-core itself).
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::InvalidState => "INVALID_STATE",
            ErrorKind::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::Storage => "STORAGE",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any storage work runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Collection has too many entries.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
