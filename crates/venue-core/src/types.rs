//! # Domain Types
//!
//! Entities and enums shared by the storage layer, the server and (through
//! ts-rs) the web client.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog             Registries            Engines                      │
//! │  ┌────────────┐      ┌────────────┐        ┌──────────────────────┐    │
//! │  │ Category   │      │ Location   │        │ Order                │    │
//! │  │ Item       │      │  type      │        │  status ─ payment    │    │
//! │  │  stock_*   │      │  counter?  │        │  OrderItem (snapshot)│    │
//! │  └────────────┘      │ Table      │        │ Transfer             │    │
//! │                      │  status    │        │  pending → done      │    │
//! │                      └────────────┘        └──────────────────────┘    │
//! │                                                                         │
//! │  Staff (identity collaborator): id, role                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity is keyed by a UUID v4 string. Orders additionally carry a
//! human-readable `order_number`, tables a `table_number`.
//!
//! Enum encodings are `snake_case` both on the wire and in SQLite, so a
//! stored `out_of_service` deserializes to [`TableStatus::OutOfService`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::stock::StockCounter;

/// Fresh entity id (UUID v4, hyphenated).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Staff
// =============================================================================

/// Role attached to an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Cashier,
    Bartender,
    Waiter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Cashier => "cashier",
            Role::Bartender => "bartender",
            Role::Waiter => "waiter",
        }
    }
}

/// A member of staff, as far as orders and reports need to know.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Staff {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A stocked item with one counter per physical location.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Item {
    pub id: String,
    pub name: String,
    /// Unique when present.
    pub sku: Option<String>,
    /// Current unit cost in cents. Orders snapshot this at creation.
    pub unit_cost_cents: i64,
    pub category_id: Option<String>,
    /// Joined from `categories`.
    pub category_name: Option<String>,
    pub stock_main_store: i64,
    pub stock_bar: i64,
    pub stock_counter: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }

    /// Current level of one stock counter.
    pub fn stock(&self, counter: StockCounter) -> i64 {
        match counter {
            StockCounter::MainStore => self.stock_main_store,
            StockCounter::Bar => self.stock_bar,
            StockCounter::Counter => self.stock_counter,
        }
    }
}

// =============================================================================
// Location
// =============================================================================

/// Which side of a transfer a location may appear on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Source,
    Destination,
    Both,
}

impl LocationType {
    #[inline]
    pub fn can_send(&self) -> bool {
        matches!(self, LocationType::Source | LocationType::Both)
    }

    #[inline]
    pub fn can_receive(&self) -> bool {
        matches!(self, LocationType::Destination | LocationType::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Source => "source",
            LocationType::Destination => "destination",
            LocationType::Both => "both",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub location_type: LocationType,
    /// Explicit counter mapping. When absent the counter is inferred from
    /// the name, see [`crate::stock::StockCounter::infer_from_name`].
    pub stock_counter: Option<StockCounter>,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Location {
    /// The item stock column this location reads and writes.
    pub fn counter(&self) -> StockCounter {
        StockCounter::resolve(self.stock_counter, &self.name)
    }
}

// =============================================================================
// Table
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    OutOfService,
}

impl Default for TableStatus {
    fn default() -> Self {
        TableStatus::Available
    }
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
            TableStatus::OutOfService => "out_of_service",
        }
    }
}

/// A physical table in the venue.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Table {
    pub id: String,
    /// Unique, usually numeric ("1", "12"), sorted numerically.
    pub table_number: String,
    pub capacity: i64,
    pub status: TableStatus,
    /// Free text, e.g. "Terrace".
    pub location: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// An occupied table with the number of orders still open on it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OccupiedTable {
    #[serde(flatten)]
    pub table: Table,
    pub active_orders: i64,
}

// =============================================================================
// Order
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Takeaway,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine_in",
            OrderType::Takeaway => "takeaway",
        }
    }
}

/// Kitchen/bar progress of an order.
///
/// ```text
/// pending ──► preparing ──► ready ──► completed
///    │            │           │
///    └────────────┴───────────┴──────► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Mobile money; always carries a transaction reference.
    Mpesa,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Mpesa => "mpesa",
        }
    }
}

/// An order header. Line items live in [`OrderItem`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// `ORD-<unix-millis>-<n>`, unique.
    pub order_number: String,
    /// Owning waiter.
    pub waiter_id: String,
    /// Joined from `staff`.
    pub waiter_name: Option<String>,
    /// Set by whoever completes or takes payment first.
    pub cashier_id: Option<String>,
    pub table_id: Option<String>,
    /// Joined from `tables`.
    pub table_number: Option<String>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    /// Σ line unit price × quantity, frozen at creation.
    pub total_amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

/// A line item. Uses the snapshot pattern: the unit price is the item's
/// cost when the order was placed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub item_id: String,
    /// Joined from `items` (current name).
    pub item_name: String,
    pub sku: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents * self.quantity)
    }
}

/// An order together with its line items. This is the payload of
/// order notifications and of every order endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Transfer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Completed => "completed",
            TransferStatus::Cancelled => "cancelled",
        }
    }
}

/// A movement of one item's stock between two locations.
///
/// Stock changes exactly once, when the transfer completes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transfer {
    pub id: String,
    pub from_location_id: String,
    pub from_location_name: String,
    pub to_location_id: String,
    pub to_location_name: String,
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub status: TransferStatus,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================
