//! # Stock Counters
//!
//! Items carry three fixed stock columns. A location maps onto exactly one
//! of them, either through its explicit `stock_counter` field or, for
//! locations created without one, through its name.
//!
//! ```text
//! Location                        Item column
//! ─────────────────────────────   ────────────────
//! stock_counter = Some(c)    ──►  c.column()
//! name contains "main"/"store" ─►  stock_main_store
//! name contains "bar"        ──►  stock_bar
//! name contains "counter"    ──►  stock_counter
//! anything else              ──►  stock_main_store
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One of the per-location stock columns on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockCounter {
    MainStore,
    Bar,
    Counter,
}

impl StockCounter {
    /// Column name on the `items` table.
    ///
    /// The returned string is one of three fixed identifiers and is the only
    /// value ever interpolated into SQL by the storage layer.
    pub const fn column(&self) -> &'static str {
        match self {
            StockCounter::MainStore => "stock_main_store",
            StockCounter::Bar => "stock_bar",
            StockCounter::Counter => "stock_counter",
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            StockCounter::MainStore => "main_store",
            StockCounter::Bar => "bar",
            StockCounter::Counter => "counter",
        }
    }

    /// Name-matching compatibility mapping for locations without an
    /// explicit counter. Case-insensitive; "main"/"store" win over "bar".
    pub fn infer_from_name(name: &str) -> StockCounter {
        let name = name.to_lowercase();
        if name.contains("main") || name.contains("store") {
            StockCounter::MainStore
        } else if name.contains("bar") {
            StockCounter::Bar
        } else if name.contains("counter") {
            StockCounter::Counter
        } else {
            StockCounter::MainStore
        }
    }

    /// Explicit mapping first, name shim second.
    pub fn resolve(explicit: Option<StockCounter>, name: &str) -> StockCounter {
        explicit.unwrap_or_else(|| StockCounter::infer_from_name(name))
    }
}
