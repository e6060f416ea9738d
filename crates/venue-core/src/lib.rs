//! # venue-core: Pure Domain Logic for Venue POS
//!
//! Everything that decides whether an order, a transfer or a stock movement
//! is legal lives here, as plain functions over plain data. Storage and
//! transport live elsewhere.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Venue POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/venue-server                            │   │
//! │  │     HTTP routes ──► auth (Actor) ──► engines ──► Notifier       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ venue-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌───────────┐ ┌──────────┐ ┌──────────────────┐ │   │
//! │  │   │  types   │ │ lifecycle │ │  policy  │ │ stock / sku      │ │   │
//! │  │   │  Order   │ │ status +  │ │  Actor   │ │ counter mapping  │ │   │
//! │  │   │ Transfer │ │ payment   │ │  roles   │ │ SKU derivation   │ │   │
//! │  │   └──────────┘ └───────────┘ └──────────┘ └──────────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    venue-db (Storage Layer)                     │   │
//! │  │        SQLite, migrations, transactional order/transfer engines │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities and enums (Item, Order, Transfer, Table, ...)
//! - [`requests`] - Inputs, filters and report rows
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error taxonomy
//! - [`validation`] - Input validation
//! - [`lifecycle`] - Order status, payment and transfer state machines
//! - [`policy`] - Role-based authorization for order and inventory actions
//! - [`stock`] - Location to stock-counter mapping
//! - [`sku`] - SKU derivation from item names
//! - [`events`] - Notification payloads
//!
//! ## Example Usage
//!
//! ```rust
//! use venue_core::lifecycle::check_status_transition;
//! use venue_core::OrderStatus;
//!
//! assert!(check_status_transition("o-1", OrderStatus::Pending, OrderStatus::Preparing).is_ok());
//! assert!(check_status_transition("o-1", OrderStatus::Completed, OrderStatus::Preparing).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod events;
pub mod lifecycle;
pub mod money;
pub mod policy;
pub mod requests;
pub mod sku;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use events::OrderEvent;
pub use money::Money;
pub use policy::Actor;
pub use requests::*;
pub use stock::StockCounter;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Capacity given to a table created without one.
pub const DEFAULT_TABLE_CAPACITY: i64 = 4;

/// Bar/counter level below which an item shows up in the low-stock report.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Longest SKU the catalog will derive or accept.
pub const MAX_SKU_LENGTH: usize = 20;

/// Prefix of every generated order number (`ORD-<millis>-<n>`).
pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// Maximum number of line items in a single order.
///
/// ## Business Reason
/// Keeps a single order insert bounded; a real ticket never gets near it.
pub const MAX_ORDER_LINES: usize = 200;
