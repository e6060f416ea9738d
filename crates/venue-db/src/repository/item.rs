//! # Item Repository
//!
//! Catalog items and their three stock counters.
//!
//! ## Stock Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Atomic Read-Modify-Write on a Counter                   │
//! │                                                                         │
//! │  adjust_stock(item, Bar, -3)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE items SET stock_bar = stock_bar + (-3)                         │
//! │  WHERE id = ? AND stock_bar + (-3) >= 0                                │
//! │       │                                                                 │
//! │       ├── 1 row  → applied                                             │
//! │       └── 0 rows → item missing (NotFound)                             │
//! │                    or counter too low (InsufficientStock)              │
//! │                    or counter would pass i64::MAX (InvalidArgument)    │
//! │                                                                         │
//! │  The check and the write are one statement: two concurrent callers     │
//! │  can never both pass a stale sufficiency check.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## SKU Derivation
//! Items created without a SKU get one derived from the name. Collisions
//! are resolved by suffixing (`TUSKERLAGER` → `TUSKERLAGER1` → ...); see
//! [`venue_core::sku`].

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use venue_core::sku::{derive_sku, sku_candidate, SKU_SUFFIX_LIMIT};
use venue_core::validation::{
    normalize_optional, validate_name, validate_non_negative, validate_sku,
};
use venue_core::{new_id, CoreError, Item, ItemFilter, ItemUpdate, NewItem, StockChange, StockCounter};

const ITEM_SELECT: &str = r#"
    SELECT
        i.id,
        i.name,
        i.sku,
        i.unit_cost_cents,
        i.category_id,
        c.name AS category_name,
        i.stock_main_store,
        i.stock_bar,
        i.stock_counter,
        i.created_at,
        i.updated_at
    FROM items i
    LEFT JOIN categories c ON c.id = i.category_id
"#;

/// Repository for item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ItemRepository::new(pool);
///
/// let item = repo.create(NewItem { name: "Tusker Lager".into(), unit_cost_cents: 25_000, ..Default::default() }).await?;
/// assert_eq!(item.sku.as_deref(), Some("TUSKERLAGER"));
///
/// repo.adjust_stock(&item.id, StockCounter::MainStore, 48).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Creates an item.
    ///
    /// ## SKU Rules
    /// - Explicit SKU: trimmed, internal spaces kept; a duplicate is
    ///   a `Conflict`
    /// - Blank or absent: derived from the name and made unique by suffixing
    /// - A name with no letters or digits yields no SKU
    pub async fn create(&self, input: NewItem) -> DbResult<Item> {
        let name = validate_name("name", &input.name)?;
        validate_non_negative("unit_cost_cents", input.unit_cost_cents)?;
        let opening_stock = input.stock_main_store.unwrap_or(0);
        validate_non_negative("stock_main_store", opening_stock)?;

        let category_id = normalize_optional(input.category_id.as_deref());
        if let Some(category_id) = &category_id {
            self.ensure_category(category_id).await?;
        }

        let sku = match validate_sku(input.sku.as_deref())? {
            Some(explicit) => Some(explicit),
            None => match derive_sku(&name) {
                Some(base) => Some(self.next_free_sku(&base).await?),
                None => None,
            },
        };

        let id = new_id();
        let now = Utc::now();

        debug!(id = %id, name = %name, sku = ?sku, "Creating item");

        sqlx::query(
            r#"
            INSERT INTO items (
                id, name, sku, unit_cost_cents, category_id,
                stock_main_store, stock_bar, stock_counter,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7, ?7)
            "#,
        )
        .bind(&id)
        .bind(&name)
        .bind(&sku)
        .bind(input.unit_cost_cents)
        .bind(&category_id)
        .bind(opening_stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    /// First candidate derived from `base` that no item uses yet.
    async fn next_free_sku(&self, base: &str) -> DbResult<String> {
        let now_millis = Utc::now().timestamp_millis();

        for attempt in 0..=SKU_SUFFIX_LIMIT + 1 {
            let candidate = sku_candidate(base, attempt, now_millis);
            if !self.sku_taken(&candidate).await? {
                if attempt > 0 {
                    debug!(base = %base, sku = %candidate, attempt, "Derived SKU was taken, using suffix");
                }
                return Ok(candidate);
            }
        }

        Err(DbError::Domain(CoreError::conflict(format!(
            "could not derive a free SKU from {base}"
        ))))
    }

    async fn sku_taken(&self, sku: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM items WHERE sku = ?1")
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn ensure_category(&self, category_id: &str) -> DbResult<()> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE id = ?1")
            .bind(category_id)
            .fetch_optional(&self.pool)
            .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(DbError::not_found("Category", category_id)),
        }
    }

    /// Gets an item by ID, with its category name.
    pub async fn get(&self, id: &str) -> DbResult<Item> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!("{ITEM_SELECT} WHERE i.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists items by name.
    ///
    /// `search` matches name or SKU as a case-insensitive substring.
    pub async fn list(&self, filter: ItemFilter) -> DbResult<Vec<Item>> {
        let category_id = normalize_optional(filter.category_id.as_deref());
        let pattern = normalize_optional(filter.search.as_deref())
            .map(|term| format!("%{}%", term.to_lowercase()));

        let items = sqlx::query_as::<_, Item>(&format!(
            r#"{ITEM_SELECT}
            WHERE (?1 IS NULL OR i.category_id = ?1)
              AND (?2 IS NULL OR LOWER(i.name) LIKE ?2 OR LOWER(COALESCE(i.sku, '')) LIKE ?2)
            ORDER BY i.name
            "#
        ))
        .bind(&category_id)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = items.len(), "Listed items");
        Ok(items)
    }

    /// Partial update of the descriptive fields and the unit cost.
    ///
    /// Stock is not editable here; use [`ItemRepository::adjust_stock`] or
    /// [`ItemRepository::set_stock`]. Orders already placed keep the price
    /// they captured.
    pub async fn update(&self, id: &str, update: ItemUpdate) -> DbResult<Item> {
        let current = self.get(id).await?;

        let name = match update.name.as_deref() {
            Some(name) => validate_name("name", name)?,
            None => current.name,
        };
        let sku = match update.sku.as_deref() {
            Some(sku) => validate_sku(Some(sku))?,
            None => current.sku,
        };
        let unit_cost_cents = match update.unit_cost_cents {
            Some(cost) => {
                validate_non_negative("unit_cost_cents", cost)?;
                cost
            }
            None => current.unit_cost_cents,
        };
        let category_id = match update.category_id.as_deref() {
            Some(category_id) => normalize_optional(Some(category_id)),
            None => current.category_id,
        };
        if let Some(category_id) = &category_id {
            self.ensure_category(category_id).await?;
        }

        debug!(id = %id, name = %name, unit_cost_cents, "Updating item");

        sqlx::query(
            r#"
            UPDATE items
            SET name = ?2, sku = ?3, unit_cost_cents = ?4, category_id = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(&sku)
        .bind(unit_cost_cents)
        .bind(&category_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Adds `delta` (possibly negative) to one counter.
    ///
    /// Fails with `InsufficientStock` if the counter would go below zero;
    /// nothing is written in that case.
    pub async fn adjust_stock(&self, id: &str, counter: StockCounter, delta: i64) -> DbResult<Item> {
        debug!(item_id = %id, counter = counter.as_str(), delta, "Adjusting stock");

        let mut conn = self.pool.acquire().await?;
        apply_stock_delta(&mut *conn, id, counter, delta).await?;
        drop(conn);

        self.get(id).await
    }

    /// Sets one counter to an absolute, non-negative level.
    pub async fn set_stock(&self, id: &str, counter: StockCounter, quantity: i64) -> DbResult<Item> {
        validate_non_negative("quantity", quantity)?;

        info!(item_id = %id, counter = counter.as_str(), quantity, "Setting stock level");

        let column = counter.column();
        let result = sqlx::query(&format!(
            "UPDATE items SET {column} = ?2, updated_at = ?3 WHERE id = ?1"
        ))
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.get(id).await
    }

    /// Applies an admin stock edit.
    pub async fn apply(&self, id: &str, change: StockChange) -> DbResult<Item> {
        match change {
            StockChange::Adjust { counter, delta } => self.adjust_stock(id, counter, delta).await,
            StockChange::Set { counter, quantity } => self.set_stock(id, counter, quantity).await,
        }
    }

    /// Items whose bar or counter stock is below `threshold`.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            r#"{ITEM_SELECT}
            WHERE i.stock_bar < ?1 OR i.stock_counter < ?1
            ORDER BY i.name
            "#
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Items with nothing left at the bar or the counter.
    pub async fn out_of_stock(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            r#"{ITEM_SELECT}
            WHERE i.stock_bar = 0 AND i.stock_counter = 0
            ORDER BY i.name
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Guarded counter update on an open connection or transaction.
///
/// Shared by admin stock edits and transfer completion so both go through
/// the same never-below-zero statement.
pub(crate) async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    item_id: &str,
    counter: StockCounter,
    delta: i64,
) -> DbResult<()> {
    // i64::MIN has no positive counterpart to report as `requested`.
    if delta == i64::MIN {
        return Err(DbError::invalid_argument("stock delta is out of range"));
    }

    let column = counter.column();

    // SQLite turns an overflowing integer sum into a REAL, so the upper
    // bound is checked without computing the sum.
    let result = sqlx::query(&format!(
        r#"
        UPDATE items
        SET {column} = {column} + ?2, updated_at = ?3
        WHERE id = ?1
          AND {column} + ?2 >= 0
          AND (?2 <= 0 OR {column} <= 9223372036854775807 - ?2)
        "#
    ))
    .bind(item_id)
    .bind(delta)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    let available: Option<i64> =
        sqlx::query_scalar(&format!("SELECT {column} FROM items WHERE id = ?1"))
            .bind(item_id)
            .fetch_optional(&mut *conn)
            .await?;

    match available {
        None => Err(DbError::not_found("Item", item_id)),
        Some(available) if delta > 0 => Err(DbError::invalid_argument(format!(
            "stock for item {item_id} cannot exceed {} (holds {available}, adding {delta})",
            i64::MAX
        ))),
        Some(available) => Err(DbError::Domain(CoreError::InsufficientStock {
            item_id: item_id.to_string(),
            available,
            requested: -delta,
        })),
    }
}
