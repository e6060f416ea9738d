//! # Category Repository
//!
//! Catalog categories. Items reference a category optionally; a category
//! cannot be deleted while any item still points at it.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use venue_core::validation::{normalize_optional, validate_name};
use venue_core::{new_id, Category, CategoryUpdate, NewCategory};

const CATEGORY_COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Creates a category. A duplicate name fails with `Conflict`.
    pub async fn create(&self, input: NewCategory) -> DbResult<Category> {
        let name = validate_name("name", &input.name)?;
        let description = normalize_optional(input.description.as_deref());
        let id = new_id();
        let now = Utc::now();

        debug!(id = %id, name = %name, "Creating category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(&id)
        .bind(&name)
        .bind(&description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    pub async fn get(&self, id: &str) -> DbResult<Category> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Whether a category with this id exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// All categories, by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Partial update. A blank description clears it.
    pub async fn update(&self, id: &str, update: CategoryUpdate) -> DbResult<Category> {
        let current = self.get(id).await?;

        let name = match update.name.as_deref() {
            Some(name) => validate_name("name", name)?,
            None => current.name,
        };
        let description = match update.description.as_deref() {
            Some(description) => normalize_optional(Some(description)),
            None => current.description,
        };

        debug!(id = %id, name = %name, "Updating category");

        sqlx::query(
            r#"
            UPDATE categories
            SET name = ?2, description = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(&description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Deletes a category that no item references.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        // The guard and the delete are one statement so a concurrent item
        // insert cannot slip in between them.
        let result = sqlx::query(
            r#"
            DELETE FROM categories
            WHERE id = ?1
              AND NOT EXISTS (SELECT 1 FROM items WHERE category_id = ?1)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            if self.exists(id).await? {
                return Err(DbError::invalid_state(
                    "cannot delete category: items still reference it",
                ));
            }
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use venue_core::{CategoryUpdate, ErrorKind, NewCategory, NewItem};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_update_list() {
        let db = setup().await;
        let repo = db.categories();

        let spirits = repo
            .create(NewCategory {
                name: "  Spirits ".into(),
                description: Some("Whisky, gin".into()),
            })
            .await
            .unwrap();
        assert_eq!(spirits.name, "Spirits");

        repo.create(NewCategory {
            name: "Beer".into(),
            description: None,
        })
        .await
        .unwrap();

        let updated = repo
            .update(
                &spirits.id,
                CategoryUpdate {
                    name: None,
                    description: Some("  ".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Spirits");
        assert!(updated.description.is_none());

        let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Beer", "Spirits"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let db = setup().await;
        let input = NewCategory {
            name: "Soft Drinks".into(),
            description: None,
        };
        db.categories().create(input.clone()).await.unwrap();
        let err = db.categories().create(input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_delete_guarded_by_items() {
        let db = setup().await;
        let category = db
            .categories()
            .create(NewCategory {
                name: "Beer".into(),
                description: None,
            })
            .await
            .unwrap();

        db.items()
            .create(NewItem {
                name: "Tusker".into(),
                unit_cost_cents: 25_000,
                category_id: Some(category.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();

        let err = db.categories().delete(&category.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        let err = db.categories().delete("missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
