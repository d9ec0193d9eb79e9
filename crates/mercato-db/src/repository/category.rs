//! # Category Repository
//!
//! Database operations for categories.
//!
//! ## Cascading Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  delete_cascade("dairy")                                │
//! │                                                                         │
//! │  BEGIN TRANSACTION                                                      │
//! │       │                                                                 │
//! │       ├── DELETE variants of products in the category                  │
//! │       │                                                                 │
//! │       ├── DELETE products in the category                              │
//! │       │                                                                 │
//! │       └── DELETE the category row                                      │
//! │       │                                                                 │
//! │  COMMIT (or rollback on any failure)                                    │
//! │                                                                         │
//! │  Either every row is gone, or none are: a crash mid-cascade never      │
//! │  leaves orphaned products pointing at a deleted category.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use mercato_core::Category;

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

    /// Lists all categories sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Category))` - Category found
    /// * `Ok(None)` - Category not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name
            FROM categories
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Category id already exists
    pub async fn insert(&self, category: &Category) -> DbResult<()> {
        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name)
            VALUES (?1, ?2)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes a category and everything under it, atomically.
    ///
    /// ## What This Does
    /// 1. Deletes all variants of products in the category
    /// 2. Deletes all products in the category
    /// 3. Deletes the category row
    ///
    /// All three steps run in one transaction; an error at any step rolls
    /// back the earlier deletes.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Category doesn't exist (nothing deleted)
    pub async fn delete_cascade(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category (cascading)");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM variants
            WHERE product_id IN (SELECT id FROM products WHERE category_id = ?1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM products WHERE category_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // Transaction drops here, rolling back the (empty) deletes
            return Err(DbError::not_found("Category", id));
        }

        tx.commit().await?;

        Ok(())
    }

    /// Counts categories (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new category ID.
pub fn generate_category_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::tests_support::product_with_variants;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = test_db().await;
        let repo = db.categories();

        repo.insert(&category("drinks", "Drinks")).await.unwrap();
        repo.insert(&category("dairy", "Dairy")).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        // Sorted by name
        assert_eq!(all[0].name, "Dairy");
        assert_eq!(all[1].name, "Drinks");
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let db = test_db().await;
        let repo = db.categories();

        repo.insert(&category("drinks", "Drinks")).await.unwrap();
        let err = repo.insert(&category("drinks", "Other")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_category() {
        let db = test_db().await;
        let err = db.categories().delete_cascade("ghost").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_cascade_removes_products_and_variants() {
        let db = test_db().await;
        db.categories()
            .insert(&category("dairy", "Dairy"))
            .await
            .unwrap();

        // Two products in the category, 2 + 3 = 5 variants total
        let p1 = product_with_variants("p1", "dairy", &["1L", "5L"]);
        let p2 = product_with_variants("p2", "dairy", &["250g", "500g", "1kg"]);
        db.products().insert_with_variants(&p1).await.unwrap();
        db.products().insert_with_variants(&p2).await.unwrap();

        assert_eq!(db.products().count().await.unwrap(), 2);
        assert_eq!(db.products().count_variants().await.unwrap(), 5);

        db.categories().delete_cascade("dairy").await.unwrap();

        assert_eq!(db.products().count().await.unwrap(), 0);
        assert_eq!(db.products().count_variants().await.unwrap(), 0);
        assert!(db.categories().get_by_id("dairy").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_cascade_spares_other_categories() {
        let db = test_db().await;
        db.categories()
            .insert(&category("dairy", "Dairy"))
            .await
            .unwrap();
        db.categories()
            .insert(&category("drinks", "Drinks"))
            .await
            .unwrap();

        let keep = product_with_variants("keep", "drinks", &["330ml"]);
        let gone = product_with_variants("gone", "dairy", &["1L"]);
        db.products().insert_with_variants(&keep).await.unwrap();
        db.products().insert_with_variants(&gone).await.unwrap();

        db.categories().delete_cascade("dairy").await.unwrap();

        assert_eq!(db.products().count().await.unwrap(), 1);
        assert!(db.products().get_by_id("keep").await.unwrap().is_some());
        assert!(db.products().get_by_id("gone").await.unwrap().is_none());
    }
}
