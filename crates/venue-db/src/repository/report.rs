//! # Report Repository
//!
//! Read-only sales aggregates. Only paid orders count as sales; the range
//! applies to order creation time and is inclusive on both ends.
//!
//! Revenue always uses the price captured on the order line, so editing an
//! item's cost never rewrites past sales. The `unit_cost_cents` column of
//! the item report is the *current* catalog cost, for reference.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use venue_core::{
    DashboardSummary, ItemSalesRow, OrderStatus, PaymentStatus, ReportRange, StaffSalesRow,
    TableStatus, TransferStatus,
};

/// Repository for sales reporting.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Per-item quantity and revenue, highest revenue first, numbered from 1.
    pub async fn item_sales(&self, range: ReportRange) -> DbResult<Vec<ItemSalesRow>> {
        let mut rows = sqlx::query_as::<_, ItemSalesRow>(
            r#"
            SELECT
                i.id AS item_id,
                i.name AS item_name,
                SUM(oi.quantity) AS quantity_sold,
                i.unit_cost_cents,
                SUM(oi.quantity * oi.unit_price_cents) AS revenue_cents
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN items i ON i.id = oi.item_id
            WHERE o.payment_status = ?1
              AND o.created_at >= ?2
              AND o.created_at <= ?3
            GROUP BY i.id, i.name, i.unit_cost_cents
            HAVING quantity_sold > 0
            ORDER BY revenue_cents DESC, i.name
            "#,
        )
        .bind(PaymentStatus::Paid)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        for (index, row) in rows.iter_mut().enumerate() {
            row.number = index as i64 + 1;
        }

        debug!(rows = rows.len(), start = %range.start, end = %range.end, "Item sales report");
        Ok(rows)
    }

    /// Per-waiter takings split by payment method, highest total first.
    ///
    /// Only active waiters, cashiers and bartenders with at least one paid
    /// order in range appear.
    pub async fn staff_sales(&self, range: ReportRange) -> DbResult<Vec<StaffSalesRow>> {
        let mut rows = sqlx::query_as::<_, StaffSalesRow>(
            r#"
            SELECT
                s.id AS staff_id,
                s.full_name,
                COUNT(o.id) AS order_count,
                COALESCE(SUM(CASE WHEN o.payment_method = 'cash' THEN o.total_amount_cents ELSE 0 END), 0)
                    AS cash_cents,
                COALESCE(SUM(CASE WHEN o.payment_method = 'mpesa' THEN o.total_amount_cents ELSE 0 END), 0)
                    AS mpesa_cents,
                COALESCE(SUM(o.total_amount_cents), 0) AS total_cents
            FROM staff s
            JOIN orders o
              ON o.waiter_id = s.id
             AND o.payment_status = ?1
             AND o.created_at >= ?2
             AND o.created_at <= ?3
            WHERE s.role IN ('waiter', 'cashier', 'bartender')
              AND s.is_active = 1
            GROUP BY s.id, s.full_name
            HAVING total_cents > 0
            ORDER BY total_cents DESC, s.full_name
            "#,
        )
        .bind(PaymentStatus::Paid)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        for (index, row) in rows.iter_mut().enumerate() {
            row.number = index as i64 + 1;
        }

        debug!(rows = rows.len(), "Staff sales report");
        Ok(rows)
    }

    /// Dashboard counters. "Today" is the UTC day containing `now`.
    pub async fn summary(&self, now: DateTime<Utc>) -> DbResult<DashboardSummary> {
        let start_of_day = Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::default()));

        let (pending, preparing, ready, completed, cancelled): (i64, i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COALESCE(SUM(CASE WHEN status = ?1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = ?2 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = ?3 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = ?4 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = ?5 THEN 1 ELSE 0 END), 0)
                FROM orders
                "#,
            )
            .bind(OrderStatus::Pending)
            .bind(OrderStatus::Preparing)
            .bind(OrderStatus::Ready)
            .bind(OrderStatus::Completed)
            .bind(OrderStatus::Cancelled)
            .fetch_one(&self.pool)
            .await?;

        let paid_revenue_today_cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_amount_cents), 0) FROM orders
            WHERE payment_status = ?1 AND paid_at >= ?2
            "#,
        )
        .bind(PaymentStatus::Paid)
        .bind(start_of_day)
        .fetch_one(&self.pool)
        .await?;

        let pending_transfers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transfers WHERE status = ?1")
                .bind(TransferStatus::Pending)
                .fetch_one(&self.pool)
                .await?;

        let occupied_tables: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tables WHERE status = ?1")
            .bind(TableStatus::Occupied)
            .fetch_one(&self.pool)
            .await?;

        Ok(DashboardSummary {
            pending_orders: pending,
            preparing_orders: preparing,
            ready_orders: ready,
            completed_orders: completed,
            cancelled_orders: cancelled,
            paid_revenue_today_cents,
            pending_transfers,
            occupied_tables,
        })
    }
}
