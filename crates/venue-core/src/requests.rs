//! # Requests, Filters and Report Rows
//!
//! Inputs accepted by the engines and registries, and the derived rows the
//! reporting queries produce. Optional fields on `*Update` structs mean
//! "leave unchanged".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::stock::StockCounter;
use crate::types::{
    LocationType, OrderStatus, OrderType, PaymentMethod, PaymentStatus, Role, TableStatus,
    TransferStatus,
};

// =============================================================================
// Staff
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewStaff {
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewItem {
    pub name: String,
    /// Explicit SKU. Blank or absent means "derive from name".
    pub sku: Option<String>,
    pub unit_cost_cents: i64,
    pub category_id: Option<String>,
    /// Opening main-store stock, default 0.
    pub stock_main_store: Option<i64>,
}

/// Partial item edit. A blank `sku` clears the SKU.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub unit_cost_cents: Option<i64>,
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemFilter {
    pub category_id: Option<String>,
    /// Case-insensitive substring of name or SKU.
    pub search: Option<String>,
}

/// Admin stock edit on one counter: either a signed delta or an absolute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StockChange {
    Adjust { counter: StockCounter, delta: i64 },
    Set { counter: StockCounter, quantity: i64 },
}

// =============================================================================
// Locations and Tables
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewLocation {
    pub name: String,
    pub location_type: LocationType,
    pub stock_counter: Option<StockCounter>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LocationUpdate {
    pub name: Option<String>,
    pub location_type: Option<LocationType>,
    pub stock_counter: Option<StockCounter>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewTable {
    pub table_number: String,
    pub capacity: Option<i64>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TableUpdate {
    pub table_number: Option<String>,
    pub capacity: Option<i64>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TableFilter {
    pub status: Option<TableStatus>,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineRequest {
    pub item_id: String,
    pub quantity: i64,
}

/// A request to place an order.
///
/// `order_type` may be omitted: it is inferred from `table_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrder {
    /// Owner. Ignored for waiters, who always own what they create.
    pub waiter_id: Option<String>,
    pub items: Vec<OrderLineRequest>,
    pub order_type: Option<OrderType>,
    pub table_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentUpdate {
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    /// M-Pesa transaction code.
    #[serde(alias = "mpesa_reference")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub waiter_id: Option<String>,
    #[ts(as = "Option<String>")]
    pub start_date: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

// =============================================================================
// Transfers
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewTransfer {
    pub from_location_id: String,
    pub to_location_id: String,
    pub item_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferFilter {
    pub status: Option<TransferStatus>,
    pub to_location_id: Option<String>,
}

// =============================================================================
// Reports
// =============================================================================

/// Inclusive `[start, end]` over order creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportRange {
    #[ts(as = "String")]
    pub start: DateTime<Utc>,
    #[ts(as = "String")]
    pub end: DateTime<Utc>,
}

impl ReportRange {
    /// Fills missing bounds: `end` defaults to `now`, `start` to
    /// `default_days` before `end`.
    pub fn resolve(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        default_days: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let end = end.unwrap_or(now);
        let start = start.unwrap_or(end - chrono::Duration::days(default_days));
        ReportRange { start, end }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ItemSalesRow {
    /// 1-based position by revenue.
    #[cfg_attr(feature = "sqlx", sqlx(default))]
    pub number: i64,
    pub item_id: String,
    pub item_name: String,
    pub quantity_sold: i64,
    /// Current catalog cost, not the captured price.
    pub unit_cost_cents: i64,
    /// Σ quantity × captured price.
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StaffSalesRow {
    #[cfg_attr(feature = "sqlx", sqlx(default))]
    pub number: i64,
    pub staff_id: String,
    pub full_name: String,
    pub order_count: i64,
    pub cash_cents: i64,
    pub mpesa_cents: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    pub pending_orders: i64,
    pub preparing_orders: i64,
    pub ready_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    pub paid_revenue_today_cents: i64,
    pub pending_transfers: i64,
    pub occupied_tables: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_report_range_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let range = ReportRange::resolve(None, None, 30, now);
        assert_eq!(range.end, now);
        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap());

        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let range = ReportRange::resolve(Some(start), None, 30, now);
        assert_eq!(range.start, start);
    }

    #[test]
    fn test_stock_change_wire_format() {
        let change: StockChange =
            serde_json::from_str(r#"{"mode":"adjust","counter":"bar","delta":-3}"#).unwrap();
        assert_eq!(
            change,
            StockChange::Adjust {
                counter: StockCounter::Bar,
                delta: -3
            }
        );
    }

    #[test]
    fn test_payment_update_accepts_mpesa_reference() {
        let update: PaymentUpdate = serde_json::from_str(
            r#"{"payment_status":"paid","payment_method":"mpesa","mpesa_reference":"QK12ABC34D"}"#,
        )
        .unwrap();
        assert_eq!(update.payment_status, PaymentStatus::Paid);
        assert_eq!(update.payment_method, Some(PaymentMethod::Mpesa));
        assert_eq!(update.reference.as_deref(), Some("QK12ABC34D"));

        let update: PaymentUpdate =
            serde_json::from_str(r#"{"payment_status":"pending","reference":"QK99"}"#).unwrap();
        assert_eq!(update.reference.as_deref(), Some("QK99"));
    }
}
