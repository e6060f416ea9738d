//! # Order Repository
//!
//! The order engine: creation, the status and payment state machines, and
//! order reads. Every mutation consults [`venue_core::policy`] first.
//!
//! ## Order Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   One Transaction per New Order                         │
//! │                                                                         │
//! │  validate lines, resolve type + owner          (no I/O)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  ├── UPDATE tables SET status = 'occupied'     (dine-in only)          │
//! │  ├── INSERT orders (total 0)                   (retry on number clash) │
//! │  ├── INSERT order_items ... SELECT unit_cost   (price captured here)   │
//! │  │   FROM items ... RETURNING unit_price_cents                         │
//! │  ├── UPDATE orders SET total = Σ price × qty                           │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure drops the transaction: no header, no lines, table as      │
//! │  it was.                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transitions
//! Status and payment changes are compare-and-set updates
//! (`WHERE id = ? AND status = <status we validated against>`). If another
//! request moved the order first, zero rows match and the caller gets
//! `InvalidState` instead of a silently overwritten state.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use venue_core::lifecycle::{
    check_payment_transition, check_status_transition, order_number, order_total,
    resolve_order_type, validate_payment_details,
};
use venue_core::policy::{
    authorize_order_action, resolve_order_owner, scope_order_filter, OrderAction,
};
use venue_core::validation::{normalize_optional, validate_order_lines};
use venue_core::{
    new_id, Actor, Money, NewOrder, Order, OrderDetail, OrderFilter, OrderItem, OrderStatus,
    PaymentMethod, PaymentStatus, PaymentUpdate, TableStatus,
};

/// Generated order numbers are retried this many times on a UNIQUE clash.
const ORDER_NUMBER_ATTEMPTS: u32 = 5;

const ORDER_SELECT: &str = r#"
    SELECT
        o.id,
        o.order_number,
        o.waiter_id,
        w.full_name AS waiter_name,
        o.cashier_id,
        o.table_id,
        t.table_number,
        o.order_type,
        o.status,
        o.payment_status,
        o.payment_method,
        o.payment_reference,
        o.total_amount_cents,
        o.created_at,
        o.updated_at,
        o.completed_at,
        o.paid_at
    FROM orders o
    LEFT JOIN staff w ON w.id = o.waiter_id
    LEFT JOIN tables t ON t.id = o.table_id
"#;

const ORDER_ITEMS_SELECT: &str = r#"
    SELECT
        oi.id,
        oi.order_id,
        oi.item_id,
        i.name AS item_name,
        i.sku,
        oi.quantity,
        oi.unit_price_cents
    FROM order_items oi
    JOIN items i ON i.id = oi.item_id
    WHERE oi.order_id = ?1
    ORDER BY oi.line_no
"#;

/// Repository for orders and their line items.
///
/// ## Usage
/// ```rust,ignore
/// let actor = Actor::new(&waiter.id, Role::Waiter);
/// let order = db.orders().create(&actor, NewOrder {
///     items: vec![OrderLineRequest { item_id: tusker.id.clone(), quantity: 2 }],
///     table_id: Some(table.id.clone()),
///     ..Default::default()
/// }).await?;
///
/// db.orders().update_status(&actor, &order.order.id, OrderStatus::Preparing).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Places an order.
    ///
    /// ## Errors
    /// - `InvalidArgument`: no lines, non-positive quantity, dine-in without
    ///   a table, takeaway with one
    /// - `NotFound`: unknown waiter, table or item
    pub async fn create(&self, actor: &Actor, input: NewOrder) -> DbResult<OrderDetail> {
        validate_order_lines(&input.items)?;
        let table_id = normalize_optional(input.table_id.as_deref());
        let order_type = resolve_order_type(input.order_type, table_id.as_deref())?;
        let waiter_id = resolve_order_owner(actor, input.waiter_id.as_deref());
        self.ensure_staff(&waiter_id).await?;

        let order_id = new_id();
        let now = Utc::now();

        debug!(
            order_id = %order_id,
            waiter_id = %waiter_id,
            order_type = order_type.as_str(),
            lines = input.items.len(),
            "Creating order"
        );

        let mut tx = self.pool.begin().await?;

        // The table flip comes first so the transaction takes the write lock
        // before it reads anything.
        if let Some(table_id) = &table_id {
            let result =
                sqlx::query("UPDATE tables SET status = ?2, updated_at = ?3 WHERE id = ?1")
                    .bind(table_id)
                    .bind(TableStatus::Occupied)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Table", table_id));
            }
        }

        let mut attempt = 0;
        let number = loop {
            attempt += 1;
            let candidate = order_number(now, Uuid::new_v4().as_u128());

            let inserted = sqlx::query(
                r#"
                INSERT INTO orders (
                    id, order_number, waiter_id, table_id, order_type,
                    status, payment_status, total_amount_cents, created_at, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)
                "#,
            )
            .bind(&order_id)
            .bind(&candidate)
            .bind(&waiter_id)
            .bind(&table_id)
            .bind(order_type)
            .bind(OrderStatus::Pending)
            .bind(PaymentStatus::Pending)
            .bind(now)
            .execute(&mut *tx)
            .await;

            match inserted {
                Ok(_) => break candidate,
                Err(err) => {
                    let err = DbError::from(err);
                    if err.is_unique_violation_on("orders.order_number")
                        && attempt < ORDER_NUMBER_ATTEMPTS
                    {
                        warn!(order_number = %candidate, attempt, "Order number taken, regenerating");
                        continue;
                    }
                    return Err(err);
                }
            }
        };

        let mut priced = Vec::with_capacity(input.items.len());
        for (line_no, line) in input.items.iter().enumerate() {
            let unit_price: Option<i64> = sqlx::query_scalar(
                r#"
                INSERT INTO order_items (id, order_id, item_id, line_no, quantity, unit_price_cents)
                SELECT ?1, ?2, id, ?3, ?4, unit_cost_cents FROM items WHERE id = ?5
                RETURNING unit_price_cents
                "#,
            )
            .bind(new_id())
            .bind(&order_id)
            .bind(line_no as i64)
            .bind(line.quantity)
            .bind(&line.item_id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(unit_price) = unit_price else {
                return Err(DbError::not_found("Item", &line.item_id));
            };
            priced.push((Money::from_cents(unit_price), line.quantity));
        }

        let total = order_total(priced)?;

        sqlx::query("UPDATE orders SET total_amount_cents = ?2 WHERE id = ?1")
            .bind(&order_id)
            .bind(total.cents())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            order_id = %order_id,
            order_number = %number,
            total = %total,
            "Order created"
        );

        self.get(&order_id).await
    }

    async fn ensure_staff(&self, staff_id: &str) -> DbResult<()> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM staff WHERE id = ?1")
            .bind(staff_id)
            .fetch_optional(&self.pool)
            .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(DbError::not_found("Staff", staff_id)),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Order header only.
    pub async fn find_order(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!("{ORDER_SELECT} WHERE o.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    async fn get_order(&self, id: &str) -> DbResult<Order> {
        self.find_order(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Line items of an order, in the order they were placed.
    pub async fn items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(ORDER_ITEMS_SELECT)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Order with line items, regardless of who asks.
    pub async fn get(&self, id: &str) -> DbResult<OrderDetail> {
        let order = self.get_order(id).await?;
        let items = self.items(id).await?;
        Ok(OrderDetail { order, items })
    }

    /// Order with line items, if `actor` may see it.
    pub async fn get_for(&self, actor: &Actor, id: &str) -> DbResult<OrderDetail> {
        let detail = self.get(id).await?;
        authorize_order_action(actor, &detail.order.waiter_id, OrderAction::View)?;
        Ok(detail)
    }

    /// Lists orders newest first. Waiters only ever see their own.
    pub async fn list(&self, actor: &Actor, filter: OrderFilter) -> DbResult<Vec<Order>> {
        let filter = scope_order_filter(actor, filter);
        let waiter_id = normalize_optional(filter.waiter_id.as_deref());

        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"{ORDER_SELECT}
            WHERE (?1 IS NULL OR o.status = ?1)
              AND (?2 IS NULL OR o.waiter_id = ?2)
              AND (?3 IS NULL OR o.created_at >= ?3)
              AND (?4 IS NULL OR o.created_at <= ?4)
            ORDER BY o.created_at DESC
            LIMIT ?5
            "#
        ))
        .bind(filter.status)
        .bind(&waiter_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.limit.filter(|limit| *limit >= 0).unwrap_or(-1))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Moves an order along the status graph.
    ///
    /// Completion stamps `completed_at`, records the actor as cashier if
    /// none is set yet and releases the table. Cancellation releases the
    /// table once no other open order sits on it.
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: &str,
        status: OrderStatus,
    ) -> DbResult<OrderDetail> {
        let order = self.get_order(id).await?;
        authorize_order_action(actor, &order.waiter_id, OrderAction::ChangeStatus(status))?;
        check_status_transition(&order.order_number, order.status, status)?;

        let completing = status == OrderStatus::Completed;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?3,
                updated_at = ?4,
                completed_at = CASE WHEN ?5 THEN ?4 ELSE completed_at END,
                cashier_id = CASE WHEN ?5 THEN COALESCE(cashier_id, ?6) ELSE cashier_id END
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(order.status)
        .bind(status)
        .bind(now)
        .bind(completing)
        .bind(&actor.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::invalid_state(format!(
                "order {} was changed concurrently, reload and retry",
                order.order_number
            )));
        }

        if let Some(table_id) = &order.table_id {
            match status {
                OrderStatus::Completed => {
                    sqlx::query("UPDATE tables SET status = ?2, updated_at = ?3 WHERE id = ?1")
                        .bind(table_id)
                        .bind(TableStatus::Available)
                        .bind(now)
                        .execute(&mut *tx)
                        .await?;
                }
                OrderStatus::Cancelled => {
                    sqlx::query(
                        r#"
                        UPDATE tables SET status = ?2, updated_at = ?3
                        WHERE id = ?1 AND status = ?4
                          AND NOT EXISTS (
                              SELECT 1 FROM orders
                              WHERE table_id = ?1 AND status NOT IN ('completed', 'cancelled')
                          )
                        "#,
                    )
                    .bind(table_id)
                    .bind(TableStatus::Available)
                    .bind(now)
                    .bind(TableStatus::Occupied)
                    .execute(&mut *tx)
                    .await?;
                }
                _ => {}
            }
        }

        tx.commit().await?;

        info!(
            order_id = %id,
            order_number = %order.order_number,
            from = order.status.as_str(),
            to = status.as_str(),
            actor = %actor.id,
            "Order status changed"
        );

        self.get(id).await
    }

    /// `update_status(.., Completed)`.
    pub async fn complete(&self, actor: &Actor, id: &str) -> DbResult<OrderDetail> {
        self.update_status(actor, id, OrderStatus::Completed).await
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Moves an order along the payment graph.
    ///
    /// ## Errors
    /// - `InvalidArgument`: paid without a method, M-Pesa without reference
    /// - `InvalidState`: edge not in the payment graph, or paying a
    ///   cancelled order
    pub async fn update_payment(
        &self,
        actor: &Actor,
        id: &str,
        update: PaymentUpdate,
    ) -> DbResult<OrderDetail> {
        let details = validate_payment_details(&update)?;
        let order = self.get_order(id).await?;
        authorize_order_action(actor, &order.waiter_id, OrderAction::ChangePayment)?;
        check_payment_transition(
            &order.order_number,
            order.status,
            order.payment_status,
            update.payment_status,
        )?;

        let paying = update.payment_status == PaymentStatus::Paid;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = ?3,
                updated_at = ?4,
                paid_at = CASE WHEN ?5 THEN ?4 ELSE paid_at END,
                cashier_id = CASE WHEN ?5 THEN COALESCE(cashier_id, ?6) ELSE cashier_id END,
                payment_method = COALESCE(?7, payment_method),
                payment_reference = COALESCE(?8, payment_reference)
            WHERE id = ?1
              AND payment_status = ?2
              AND NOT (?5 AND status = 'cancelled')
            "#,
        )
        .bind(id)
        .bind(order.payment_status)
        .bind(update.payment_status)
        .bind(now)
        .bind(paying)
        .bind(&actor.id)
        .bind(details.method)
        .bind(&details.reference)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::invalid_state(format!(
                "order {} was changed concurrently, reload and retry",
                order.order_number
            )));
        }

        info!(
            order_id = %id,
            order_number = %order.order_number,
            from = order.payment_status.as_str(),
            to = update.payment_status.as_str(),
            method = details.method.map(|m| m.as_str()),
            actor = %actor.id,
            "Order payment status changed"
        );

        self.get(id).await
    }

    /// `update_payment(.., Paid)`. A method is still required.
    pub async fn mark_paid(
        &self,
        actor: &Actor,
        id: &str,
        method: Option<PaymentMethod>,
        reference: Option<String>,
    ) -> DbResult<OrderDetail> {
        self.update_payment(
            actor,
            id,
            PaymentUpdate {
                payment_status: PaymentStatus::Paid,
                payment_method: method,
                reference,
            },
        )
        .await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
