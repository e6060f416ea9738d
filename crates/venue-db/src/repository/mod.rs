//! # Repository Module
//!
//! One repository per component. Each holds a pool handle, is created on
//! demand by [`crate::Database`], and owns the SQL for its tables.
//!
//! ## Component Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Catalog              ┌─ CategoryRepository   categories               │
//! │                        └─ ItemRepository       items, stock counters     │
//! │                                                                         │
//! │   Location Registry    ── LocationRepository   locations                │
//! │   Table Registry       ── TableRepository      tables                   │
//! │                                                                         │
//! │   Order Engine         ── OrderRepository      orders, order_items,     │
//! │                                                tables.status            │
//! │   Transfer Engine      ── TransferRepository   transfers, items.stock_* │
//! │                                                                         │
//! │   Reporting            ── ReportRepository     read-only aggregates     │
//! │   Staff directory      ── StaffRepository      staff                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transactions
//! Multi-statement mutations (order creation, order transitions that touch
//! a table, transfer completion) run inside one `pool.begin()` transaction.
//! Dropping the transaction on an early `?` return rolls it back.

pub mod category;
pub mod item;
pub mod location;
pub mod order;
pub mod report;
pub mod staff;
pub mod table;
pub mod transfer;
