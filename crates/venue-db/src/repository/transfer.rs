//! # Transfer Repository
//!
//! The transfer engine: moves stock of one item between two locations.
//!
//! ## Lifecycle
//! ```text
//!   create ──► pending ──► complete ──► completed   (stock moves here)
//!                 │
//!                 └──────► cancel ────► cancelled   (no stock effect)
//! ```
//!
//! ## Completion
//! ```text
//! BEGIN
//! ├── UPDATE transfers SET status = 'completed'
//! │   WHERE id = ? AND status = 'pending'          0 rows → InvalidState
//! ├── UPDATE items SET <from> = <from> - qty
//! │   WHERE id = ? AND <from> - qty >= 0           0 rows → InsufficientStock
//! ├── UPDATE items SET <to> = <to> + qty
//! COMMIT
//! ```
//! The status flip runs first, so a transfer can only ever be completed
//! once, and the debit re-checks stock inside the same transaction: two
//! transfers that each fit on their own but not together cannot both
//! complete.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::item::{apply_stock_delta, ItemRepository};
use crate::repository::location::LocationRepository;
use venue_core::lifecycle::check_transfer_transition;
use venue_core::policy::require_admin;
use venue_core::validation::{validate_id, validate_quantity};
use venue_core::{
    new_id, Actor, CoreError, NewTransfer, Transfer, TransferFilter, TransferStatus,
};

const TRANSFER_SELECT: &str = r#"
    SELECT
        tr.id,
        tr.from_location_id,
        fl.name AS from_location_name,
        tr.to_location_id,
        tl.name AS to_location_name,
        tr.item_id,
        i.name AS item_name,
        tr.quantity,
        tr.status,
        tr.created_by,
        tr.created_at,
        tr.completed_at,
        tr.cancelled_at
    FROM transfers tr
    JOIN locations fl ON fl.id = tr.from_location_id
    JOIN locations tl ON tl.id = tr.to_location_id
    JOIN items i ON i.id = tr.item_id
"#;

/// Repository for stock transfers.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    pool: SqlitePool,
}

impl TransferRepository {
    /// Creates a new TransferRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransferRepository { pool }
    }

    /// Records a pending transfer. Stock is checked but not touched.
    ///
    /// ## Errors
    /// - `PermissionDenied`: actor is not an admin
    /// - `InvalidArgument`: non-positive quantity, same location twice,
    ///   source cannot send or destination cannot receive
    /// - `NotFound`: unknown location, item or creator
    /// - `InsufficientStock`: the source counter holds less than `quantity`
    pub async fn create(&self, actor: &Actor, input: NewTransfer) -> DbResult<Transfer> {
        require_admin(actor, "create transfers")?;
        validate_id("from_location_id", &input.from_location_id)?;
        validate_id("to_location_id", &input.to_location_id)?;
        validate_id("item_id", &input.item_id)?;
        validate_quantity(input.quantity)?;

        if input.from_location_id == input.to_location_id {
            return Err(DbError::invalid_argument(
                "source and destination locations must differ",
            ));
        }

        let locations = LocationRepository::new(self.pool.clone());
        let from = locations.get(&input.from_location_id).await?;
        let to = locations.get(&input.to_location_id).await?;

        if !from.location_type.can_send() {
            return Err(DbError::invalid_argument(format!(
                "{} is a {} location and cannot send stock",
                from.name,
                from.location_type.as_str()
            )));
        }
        if !to.location_type.can_receive() {
            return Err(DbError::invalid_argument(format!(
                "{} is a {} location and cannot receive stock",
                to.name,
                to.location_type.as_str()
            )));
        }

        let item = ItemRepository::new(self.pool.clone())
            .get(&input.item_id)
            .await?;
        let available = item.stock(from.counter());
        if available < input.quantity {
            return Err(DbError::Domain(CoreError::InsufficientStock {
                item_id: item.id,
                available,
                requested: input.quantity,
            }));
        }

        self.ensure_staff(&actor.id).await?;

        let id = new_id();
        let now = Utc::now();

        debug!(
            transfer_id = %id,
            item_id = %input.item_id,
            from = %from.name,
            to = %to.name,
            quantity = input.quantity,
            "Creating transfer"
        );

        sqlx::query(
            r#"
            INSERT INTO transfers (
                id, from_location_id, to_location_id, item_id, quantity,
                status, created_by, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&id)
        .bind(&input.from_location_id)
        .bind(&input.to_location_id)
        .bind(&input.item_id)
        .bind(input.quantity)
        .bind(TransferStatus::Pending)
        .bind(&actor.id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
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

    pub async fn find(&self, id: &str) -> DbResult<Option<Transfer>> {
        let transfer = sqlx::query_as::<_, Transfer>(&format!("{TRANSFER_SELECT} WHERE tr.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(transfer)
    }

    /// Gets a transfer with item and location names.
    pub async fn get(&self, id: &str) -> DbResult<Transfer> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Transfer", id))
    }

    /// Lists transfers newest first.
    pub async fn list(&self, filter: TransferFilter) -> DbResult<Vec<Transfer>> {
        let transfers = sqlx::query_as::<_, Transfer>(&format!(
            r#"{TRANSFER_SELECT}
            WHERE (?1 IS NULL OR tr.status = ?1)
              AND (?2 IS NULL OR tr.to_location_id = ?2)
            ORDER BY tr.created_at DESC
            "#
        ))
        .bind(filter.status)
        .bind(&filter.to_location_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transfers)
    }

    /// Completes a pending transfer, moving the stock atomically.
    ///
    /// ## Errors
    /// - `NotFound`: unknown transfer
    /// - `InvalidState`: not pending (including losing a race to another
    ///   completion or cancellation)
    /// - `InsufficientStock`: the source counter no longer holds `quantity`;
    ///   nothing is written and the transfer stays pending
    pub async fn complete(&self, actor: &Actor, id: &str) -> DbResult<Transfer> {
        require_admin(actor, "complete transfers")?;

        let transfer = self.get(id).await?;
        check_transfer_transition(id, transfer.status, TransferStatus::Completed)?;

        let locations = LocationRepository::new(self.pool.clone());
        let from_counter = locations.get(&transfer.from_location_id).await?.counter();
        let to_counter = locations.get(&transfer.to_location_id).await?.counter();

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let flipped = sqlx::query(
            r#"
            UPDATE transfers SET status = ?2, completed_at = ?3
            WHERE id = ?1 AND status = ?4
            "#,
        )
        .bind(id)
        .bind(TransferStatus::Completed)
        .bind(now)
        .bind(TransferStatus::Pending)
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            return Err(DbError::invalid_state(format!(
                "transfer {id} is no longer pending"
            )));
        }

        apply_stock_delta(&mut *tx, &transfer.item_id, from_counter, -transfer.quantity).await?;
        apply_stock_delta(&mut *tx, &transfer.item_id, to_counter, transfer.quantity).await?;

        tx.commit().await?;

        info!(
            transfer_id = %id,
            item_id = %transfer.item_id,
            from = from_counter.as_str(),
            to = to_counter.as_str(),
            quantity = transfer.quantity,
            "Transfer completed"
        );

        self.get(id).await
    }

    /// Cancels a pending transfer. Stock is untouched.
    pub async fn cancel(&self, actor: &Actor, id: &str) -> DbResult<Transfer> {
        require_admin(actor, "cancel transfers")?;

        let result = sqlx::query(
            r#"
            UPDATE transfers SET status = ?2, cancelled_at = ?3
            WHERE id = ?1 AND status = ?4
            "#,
        )
        .bind(id)
        .bind(TransferStatus::Cancelled)
        .bind(Utc::now())
        .bind(TransferStatus::Pending)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let transfer = self.get(id).await?;
            check_transfer_transition(id, transfer.status, TransferStatus::Cancelled)?;
            return Err(DbError::invalid_state(format!(
                "transfer {id} is no longer pending"
            )));
        }

        info!(transfer_id = %id, "Transfer cancelled");

        self.get(id).await
    }

    /// Number of transfers waiting to be completed.
    pub async fn pending_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transfers WHERE status = ?1")
            .bind(TransferStatus::Pending)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
