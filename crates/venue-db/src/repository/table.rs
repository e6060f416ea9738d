//! # Table Repository
//!
//! Dining tables and their status. Any status may be set directly; the
//! order engine is the caller that gives `occupied` and `available`
//! meaning (occupied on dine-in order creation, available on completion).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use venue_core::validation::{normalize_optional, validate_name, validate_positive};
use venue_core::{
    new_id, NewTable, OccupiedTable, Table, TableFilter, TableStatus, TableUpdate,
    DEFAULT_TABLE_CAPACITY,
};

const TABLE_COLUMNS: &str =
    "id, table_number, capacity, status, location, notes, created_at, updated_at";

/// Table numbers are text ("12", "B3"); numeric ones sort numerically first.
const NATURAL_ORDER: &str = "ORDER BY CAST(table_number AS INTEGER), table_number";

const ACTIVE_ORDER: &str = "status NOT IN ('completed', 'cancelled')";

#[derive(sqlx::FromRow)]
struct OccupiedRow {
    #[sqlx(flatten)]
    table: Table,
    active_orders: i64,
}

/// Repository for table database operations.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Creates a table in `available`. Table numbers are unique (`Conflict`).
    pub async fn create(&self, input: NewTable) -> DbResult<Table> {
        let table_number = validate_name("table_number", &input.table_number)?;
        let capacity = input.capacity.unwrap_or(DEFAULT_TABLE_CAPACITY);
        validate_positive("capacity", capacity)?;
        let location = normalize_optional(input.location.as_deref());
        let notes = normalize_optional(input.notes.as_deref());
        let id = new_id();
        let now = Utc::now();

        debug!(id = %id, table_number = %table_number, capacity, "Creating table");

        sqlx::query(
            r#"
            INSERT INTO tables (id, table_number, capacity, status, location, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(&id)
        .bind(&table_number)
        .bind(capacity)
        .bind(TableStatus::Available)
        .bind(&location)
        .bind(&notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Table>> {
        let table = sqlx::query_as::<_, Table>(&format!(
            "SELECT {TABLE_COLUMNS} FROM tables WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    pub async fn get(&self, id: &str) -> DbResult<Table> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Table", id))
    }

    pub async fn get_by_number(&self, table_number: &str) -> DbResult<Table> {
        sqlx::query_as::<_, Table>(&format!(
            "SELECT {TABLE_COLUMNS} FROM tables WHERE table_number = ?1"
        ))
        .bind(table_number.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Table", table_number))
    }

    /// Lists tables in natural number order.
    pub async fn list(&self, filter: TableFilter) -> DbResult<Vec<Table>> {
        let tables = sqlx::query_as::<_, Table>(&format!(
            r#"
            SELECT {TABLE_COLUMNS} FROM tables
            WHERE (?1 IS NULL OR status = ?1)
            {NATURAL_ORDER}
            "#
        ))
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    pub async fn available(&self) -> DbResult<Vec<Table>> {
        self.list(TableFilter {
            status: Some(TableStatus::Available),
        })
        .await
    }

    /// Occupied tables with the number of non-terminal orders on each.
    pub async fn occupied(&self) -> DbResult<Vec<OccupiedTable>> {
        let rows = sqlx::query_as::<_, OccupiedRow>(&format!(
            r#"
            SELECT
                t.id, t.table_number, t.capacity, t.status, t.location, t.notes,
                t.created_at, t.updated_at,
                (SELECT COUNT(*) FROM orders o WHERE o.table_id = t.id AND o.{ACTIVE_ORDER})
                    AS active_orders
            FROM tables t
            WHERE t.status = ?1
            ORDER BY CAST(t.table_number AS INTEGER), t.table_number
            "#
        ))
        .bind(TableStatus::Occupied)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| OccupiedTable {
                table: row.table,
                active_orders: row.active_orders,
            })
            .collect())
    }

    /// Partial update of number, capacity, location and notes.
    pub async fn update(&self, id: &str, update: TableUpdate) -> DbResult<Table> {
        let current = self.get(id).await?;

        let table_number = match update.table_number.as_deref() {
            Some(number) => validate_name("table_number", number)?,
            None => current.table_number,
        };
        let capacity = update.capacity.unwrap_or(current.capacity);
        validate_positive("capacity", capacity)?;
        let location = match update.location.as_deref() {
            Some(location) => normalize_optional(Some(location)),
            None => current.location,
        };
        let notes = match update.notes.as_deref() {
            Some(notes) => normalize_optional(Some(notes)),
            None => current.notes,
        };

        debug!(id = %id, table_number = %table_number, capacity, "Updating table");

        sqlx::query(
            r#"
            UPDATE tables
            SET table_number = ?2, capacity = ?3, location = ?4, notes = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&table_number)
        .bind(capacity)
        .bind(&location)
        .bind(&notes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Sets the status directly. Every status is reachable from every other.
    pub async fn set_status(&self, id: &str, status: TableStatus) -> DbResult<Table> {
        info!(table_id = %id, status = status.as_str(), "Setting table status");

        let result = sqlx::query("UPDATE tables SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Table", id));
        }

        self.get(id).await
    }

    /// Deletes a table.
    ///
    /// ## Errors
    /// - `NotFound` if the table does not exist
    /// - `InvalidState` while a non-terminal order references it
    /// - `InvalidState` if past orders reference it; such tables are kept
    ///   for the audit trail and should be set `out_of_service` instead
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let table = self.get(id).await?;

        let (active, total): (i64, i64) = sqlx::query_as(&format!(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN {ACTIVE_ORDER} THEN 1 ELSE 0 END), 0),
                COUNT(*)
            FROM orders WHERE table_id = ?1
            "#
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if active > 0 {
            return Err(DbError::invalid_state(format!(
                "cannot delete table {}: it has {active} active order(s)",
                table.table_number
            )));
        }
        if total > 0 {
            return Err(DbError::invalid_state(format!(
                "cannot delete table {}: it has order history, mark it out_of_service instead",
                table.table_number
            )));
        }

        debug!(id = %id, table_number = %table.table_number, "Deleting table");

        let result = sqlx::query(
            "DELETE FROM tables WHERE id = ?1 AND NOT EXISTS (SELECT 1 FROM orders WHERE table_id = ?1)",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::invalid_state(format!(
                "cannot delete table {}: an order was placed on it",
                table.table_number
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use venue_core::{ErrorKind, NewTable, TableFilter, TableStatus, TableUpdate};

    fn table(number: &str) -> NewTable {
        NewTable {
            table_number: number.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_defaults_and_natural_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tables();

        for number in ["10", "2", "1"] {
            repo.create(table(number)).await.unwrap();
        }

        let tables = repo.list(TableFilter::default()).await.unwrap();
        let numbers: Vec<_> = tables.iter().map(|t| t.table_number.as_str()).collect();
        assert_eq!(numbers, vec!["1", "2", "10"]);
        assert!(tables.iter().all(|t| t.capacity == 4));
        assert!(tables.iter().all(|t| t.status == TableStatus::Available));

        let err = repo.create(table("2")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_status_and_filters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tables();
        let t1 = repo.create(table("1")).await.unwrap();
        repo.create(table("2")).await.unwrap();

        let t1 = repo.set_status(&t1.id, TableStatus::OutOfService).await.unwrap();
        assert_eq!(t1.status, TableStatus::OutOfService);

        let available = repo.available().await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].table_number, "2");

        let err = repo
            .set_status("missing", TableStatus::Reserved)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_rejects_zero_capacity() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let t1 = db.tables().create(table("1")).await.unwrap();

        let updated = db
            .tables()
            .update(
                &t1.id,
                TableUpdate {
                    capacity: Some(6),
                    location: Some("Terrace".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.capacity, 6);
        assert_eq!(updated.location.as_deref(), Some("Terrace"));

        let err = db
            .tables()
            .update(
                &t1.id,
                TableUpdate {
                    capacity: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_delete_unused_table() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let t1 = db.tables().create(table("1")).await.unwrap();
        db.tables().delete(&t1.id).await.unwrap();

        let err = db.tables().delete(&t1.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
