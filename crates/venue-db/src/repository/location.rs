//! # Location Repository
//!
//! Physical stock locations. A location's type decides which side of a
//! transfer it may appear on; its counter decides which item column it
//! reads and writes.
//!
//! ```text
//!   type          as source   as destination
//!   ───────────   ─────────   ──────────────
//!   source           ✓              ✗
//!   destination      ✗              ✓
//!   both             ✓              ✓
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use venue_core::validation::{normalize_optional, validate_name};
use venue_core::{new_id, Location, LocationType, LocationUpdate, NewLocation};

const LOCATION_COLUMNS: &str =
    "id, name, location_type, stock_counter, description, created_at, updated_at";

/// Repository for location database operations.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    pool: SqlitePool,
}

impl LocationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LocationRepository { pool }
    }

    /// Creates a location. Names are unique (`Conflict`).
    pub async fn create(&self, input: NewLocation) -> DbResult<Location> {
        let name = validate_name("name", &input.name)?;
        let description = normalize_optional(input.description.as_deref());
        let id = new_id();
        let now = Utc::now();

        debug!(
            id = %id,
            name = %name,
            location_type = input.location_type.as_str(),
            "Creating location"
        );

        sqlx::query(
            r#"
            INSERT INTO locations (id, name, location_type, stock_counter, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&id)
        .bind(&name)
        .bind(input.location_type)
        .bind(input.stock_counter)
        .bind(&description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    pub async fn get(&self, id: &str) -> DbResult<Location> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Location", id))
    }

    pub async fn get_by_name(&self, name: &str) -> DbResult<Location> {
        sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE name = ?1"
        ))
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Location", name))
    }

    /// All locations by name, optionally of one type only.
    pub async fn list(&self, location_type: Option<LocationType>) -> DbResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(&format!(
            r#"
            SELECT {LOCATION_COLUMNS} FROM locations
            WHERE (?1 IS NULL OR location_type = ?1)
            ORDER BY name
            "#
        ))
        .bind(location_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    /// Locations a transfer may start from (`source` or `both`).
    pub async fn sources(&self) -> DbResult<Vec<Location>> {
        self.list_where_type_in(LocationType::Source).await
    }

    /// Locations a transfer may end at (`destination` or `both`).
    pub async fn destinations(&self) -> DbResult<Vec<Location>> {
        self.list_where_type_in(LocationType::Destination).await
    }

    async fn list_where_type_in(&self, side: LocationType) -> DbResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(&format!(
            r#"
            SELECT {LOCATION_COLUMNS} FROM locations
            WHERE location_type IN (?1, ?2)
            ORDER BY name
            "#
        ))
        .bind(side)
        .bind(LocationType::Both)
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    /// Partial update. A blank description clears it.
    pub async fn update(&self, id: &str, update: LocationUpdate) -> DbResult<Location> {
        let current = self.get(id).await?;

        let name = match update.name.as_deref() {
            Some(name) => validate_name("name", name)?,
            None => current.name,
        };
        let location_type = update.location_type.unwrap_or(current.location_type);
        let stock_counter = update.stock_counter.or(current.stock_counter);
        let description = match update.description.as_deref() {
            Some(description) => normalize_optional(Some(description)),
            None => current.description,
        };

        debug!(id = %id, name = %name, location_type = location_type.as_str(), "Updating location");

        sqlx::query(
            r#"
            UPDATE locations
            SET name = ?2, location_type = ?3, stock_counter = ?4, description = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(location_type)
        .bind(stock_counter)
        .bind(&description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Deletes a location that no transfer references.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting location");

        let result = sqlx::query(
            r#"
            DELETE FROM locations
            WHERE id = ?1
              AND NOT EXISTS (
                  SELECT 1 FROM transfers
                  WHERE from_location_id = ?1 OR to_location_id = ?1
              )
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            if self.find(id).await?.is_some() {
                return Err(DbError::invalid_state(
                    "cannot delete location: it is referenced by transfers",
                ));
            }
            return Err(DbError::not_found("Location", id));
        }

        Ok(())
    }
}
