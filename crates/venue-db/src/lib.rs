//! # venue-db: Storage Layer and Engines for Venue POS
//!
//! SQLite access for the venue system via sqlx. Besides plain CRUD this
//! crate owns the order and transfer engines, because their correctness
//! lives in transaction boundaries and conditional updates.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Venue POS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/orders)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     venue-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ OrderRepo      │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ TransferRepo   │   │ 001_initial  │  │   │
//! │  │   │ WAL + busy    │    │ ItemRepo ...   │   │ _schema.sql  │  │   │
//! │  │   │ timeout       │    │                │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │            rules from venue-core (lifecycle, policy)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ./venue_pos.db                                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per component
//!
//! ## Usage
//!
//! ```rust,ignore
//! use venue_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("venue_pos.db")).await?;
//!
//! let admin = Actor::new(&admin_id, Role::Admin);
//! let transfer = db.transfers().create(&admin, new_transfer).await?;
//! db.transfers().complete(&admin, &transfer.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::item::ItemRepository;
pub use repository::location::LocationRepository;
pub use repository::order::OrderRepository;
pub use repository::report::ReportRepository;
pub use repository::staff::StaffRepository;
pub use repository::table::TableRepository;
pub use repository::transfer::TransferRepository;
