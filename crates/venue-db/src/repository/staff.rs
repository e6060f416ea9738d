//! # Staff Repository
//!
//! Minimal staff directory. Credentials live with the identity provider;
//! this table only exists so orders and transfers reference real people and
//! reports can print their names.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use venue_core::validation::validate_name;
use venue_core::{new_id, NewStaff, Staff};

const STAFF_COLUMNS: &str = "id, username, full_name, role, is_active, created_at";

/// Repository for staff records.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    /// Creates an active staff member. Duplicate usernames are a `Conflict`.
    pub async fn create(&self, input: NewStaff) -> DbResult<Staff> {
        let username = validate_name("username", &input.username)?;
        let full_name = validate_name("full_name", &input.full_name)?;
        let id = new_id();
        let now = Utc::now();

        debug!(id = %id, username = %username, role = input.role.as_str(), "Creating staff member");

        sqlx::query(
            r#"
            INSERT INTO staff (id, username, full_name, role, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5)
            "#,
        )
        .bind(&id)
        .bind(&username)
        .bind(&full_name)
        .bind(input.role)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Staff>> {
        let staff = sqlx::query_as::<_, Staff>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(staff)
    }

    pub async fn get(&self, id: &str) -> DbResult<Staff> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Staff", id))
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Staff> {
        sqlx::query_as::<_, Staff>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Staff", username))
    }

    /// All staff, by name.
    pub async fn list(&self) -> DbResult<Vec<Staff>> {
        let staff = sqlx::query_as::<_, Staff>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff ORDER BY full_name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(staff)
    }

    /// Deactivated staff keep their history but drop out of reports.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<Staff> {
        debug!(id = %id, active, "Updating staff activation");

        let result = sqlx::query("UPDATE staff SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Staff", id));
        }

        self.get(id).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM staff")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
