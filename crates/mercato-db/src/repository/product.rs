//! # Product Repository
//!
//! Database operations for products and their variants.
//!
//! ## The Product+Variants Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              insert_with_variants(product with N variants)             │
//! │                                                                         │
//! │  BEGIN TRANSACTION                                                      │
//! │       │                                                                 │
//! │       ├── INSERT products row                                          │
//! │       ├── INSERT variants row 1                                        │
//! │       ├── INSERT variants row 2                                        │
//! │       ├── ...                                                           │
//! │       └── INSERT variants row N                                        │
//! │       │                                                                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Either all N+1 rows become visible together, or none do. A failure    │
//! │  after variant 2 of 3 must NOT leave 1 product + 2 variants behind —   │
//! │  that would be an orphaned product a customer could not order from.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Variant rows have no independent lifecycle: updates replace the full
//! variant set, and deletes take the variants down with the product.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use mercato_core::{Product, ProductVariant, TierPrices};

// =============================================================================
// Row Types
// =============================================================================

/// Flat product row; variants are resolved with a second query.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    category_id: String,
    icon: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Flat variant row; the three tier prices are separate columns.
#[derive(Debug, Clone, sqlx::FromRow)]
struct VariantRow {
    id: String,
    product_id: String,
    size: String,
    price_a_cents: i64,
    price_b_cents: i64,
    price_c_cents: i64,
}

impl VariantRow {
    fn into_variant(self) -> ProductVariant {
        ProductVariant {
            id: self.id,
            size: self.size,
            prices: TierPrices {
                a_cents: self.price_a_cents,
                b_cents: self.price_b_cents,
                c_cents: self.price_c_cents,
            },
        }
    }
}

fn assemble(row: ProductRow, variants: Vec<ProductVariant>) -> Product {
    Product {
        id: row.id,
        name: row.name,
        category_id: row.category_id,
        icon: row.icon,
        created_at: row.created_at,
        updated_at: row.updated_at,
        variants,
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Catalog listing with resolved variants
/// let products = repo.list().await?;
///
/// // Transactional create
/// repo.insert_with_variants(&product).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products with their variants resolved.
    ///
    /// ## How It Works
    /// Two queries (products, then all variants), grouped in memory.
    /// Variant order within a product is insertion order.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, category_id, icon, created_at, updated_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let variant_rows = sqlx::query_as::<_, VariantRow>(
            r#"
            SELECT id, product_id, size, price_a_cents, price_b_cents, price_c_cents
            FROM variants
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let products = rows
            .into_iter()
            .map(|row| {
                let variants = variant_rows
                    .iter()
                    .filter(|v| v.product_id == row.id)
                    .cloned()
                    .map(VariantRow::into_variant)
                    .collect();
                assemble(row, variants)
            })
            .collect();

        Ok(products)
    }

    /// Gets a product by its ID, with variants resolved.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, category_id, icon, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let variants = sqlx::query_as::<_, VariantRow>(
            r#"
            SELECT id, product_id, size, price_a_cents, price_b_cents, price_c_cents
            FROM variants
            WHERE product_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(VariantRow::into_variant)
        .collect();

        Ok(Some(assemble(row, variants)))
    }

    /// Inserts a product and all its variants atomically.
    ///
    /// ## Atomicity
    /// One transaction covers the product row and every variant row:
    /// a failure at any point (duplicate id, constraint violation, I/O)
    /// rolls back everything already written.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Product or variant id already exists
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown category id
    pub async fn insert_with_variants(&self, product: &Product) -> DbResult<()> {
        debug!(
            id = %product.id,
            name = %product.name,
            variants = product.variants.len(),
            "Inserting product"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category_id, icon, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(&product.icon)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_variants(&mut tx, &product.id, &product.variants).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Updates a product, replacing its full variant set.
    ///
    /// ## No Diffing
    /// The old variants are superseded in full: delete old rows, insert
    /// the submitted set. Runs in one transaction with the product update.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist (nothing changed)
    pub async fn update_replace_variants(&self, product: &Product) -> DbResult<()> {
        debug!(
            id = %product.id,
            variants = product.variants.len(),
            "Updating product (replacing variants)"
        );

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category_id = ?3,
                icon = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(&product.icon)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        sqlx::query("DELETE FROM variants WHERE product_id = ?1")
            .bind(&product.id)
            .execute(&mut *tx)
            .await?;

        insert_variants(&mut tx, &product.id, &product.variants).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Deletes a product and its variants as one unit.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM variants WHERE product_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        tx.commit().await?;

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts variant rows (for diagnostics).
    pub async fn count_variants(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM variants")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Inserts variant rows within an open transaction.
async fn insert_variants(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: &str,
    variants: &[ProductVariant],
) -> DbResult<()> {
    for variant in variants {
        sqlx::query(
            r#"
            INSERT INTO variants (id, product_id, size, price_a_cents, price_b_cents, price_c_cents)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&variant.id)
        .bind(product_id)
        .bind(&variant.size)
        .bind(variant.prices.a_cents)
        .bind(variant.prices.b_cents)
        .bind(variant.prices.c_cents)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new variant ID.
pub fn generate_variant_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;

    /// Builds a product with one variant per size label; prices are
    /// derived from the variant index so tests can assert on them.
    pub fn product_with_variants(id: &str, category_id: &str, sizes: &[&str]) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            category_id: category_id.to_string(),
            icon: String::new(),
            created_at: now,
            updated_at: now,
            variants: sizes
                .iter()
                .enumerate()
                .map(|(i, size)| ProductVariant {
                    id: format!("{}-v{}", id, i),
                    size: (*size).to_string(),
                    prices: TierPrices {
                        a_cents: 1000 + i as i64 * 100,
                        b_cents: 1100 + i as i64 * 100,
                        c_cents: 1200 + i as i64 * 100,
                    },
                })
                .collect(),
        }
    }

    /// Inserts a category directly (products need one to reference).
    pub async fn seed_category(pool: &SqlitePool, id: &str) {
        sqlx::query("INSERT INTO categories (id, name) VALUES (?1, ?2)")
            .bind(id)
            .bind(format!("Category {}", id))
            .execute(pool)
            .await
            .unwrap();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::tests_support::*;
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_category(db.pool(), "pantry").await;
        db
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let product = product_with_variants("p1", "pantry", &["1kg", "5kg", "25kg"]);
        repo.insert_with_variants(&product).await.unwrap();

        let found = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(found.name, "Product p1");
        assert_eq!(found.variants.len(), 3);
        // Insertion order preserved
        assert_eq!(found.variants[0].size, "1kg");
        assert_eq!(found.variants[2].size, "25kg");
        // Tier prices round-trip
        assert_eq!(found.variants[1].prices.b_cents, 1200);
    }

    #[tokio::test]
    async fn test_create_visible_as_one_unit() {
        let db = test_db().await;
        let repo = db.products();

        let product = product_with_variants("p1", "pantry", &["1kg", "5kg", "25kg"]);
        repo.insert_with_variants(&product).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.count_variants().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_no_rows() {
        let db = test_db().await;
        let repo = db.products();

        // Third variant reuses the first variant's id, so the insert
        // fails after 2 variant rows have already been written.
        let mut product = product_with_variants("p1", "pantry", &["1kg", "5kg", "25kg"]);
        product.variants[2].id = product.variants[0].id.clone();

        let err = repo.insert_with_variants(&product).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // Never 1 product + 2 variants: the transaction rolled back
        assert_eq!(repo.count().await.unwrap(), 0);
        assert_eq!(repo.count_variants().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_rejects_unknown_category() {
        let db = test_db().await;
        let repo = db.products();

        let product = product_with_variants("p1", "no-such-category", &["1kg"]);
        let err = repo.insert_with_variants(&product).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_replaces_full_variant_set() {
        let db = test_db().await;
        let repo = db.products();

        let product = product_with_variants("p1", "pantry", &["1kg", "5kg"]);
        repo.insert_with_variants(&product).await.unwrap();

        // Replacement set has different sizes and only one entry
        let mut updated = product_with_variants("p1", "pantry", &["10kg"]);
        updated.variants[0].id = "p1-new".to_string();
        updated.name = "Renamed".to_string();
        repo.update_replace_variants(&updated).await.unwrap();

        let found = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(found.name, "Renamed");
        assert_eq!(found.variants.len(), 1);
        assert_eq!(found.variants[0].id, "p1-new");
        assert_eq!(found.variants[0].size, "10kg");

        // Old variants are gone, not merged
        assert_eq!(repo.count_variants().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = test_db().await;
        let product = product_with_variants("ghost", "pantry", &["1kg"]);

        let err = db
            .products()
            .update_replace_variants(&product)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_product_and_variants() {
        let db = test_db().await;
        let repo = db.products();

        let product = product_with_variants("p1", "pantry", &["1kg", "5kg"]);
        repo.insert_with_variants(&product).await.unwrap();

        repo.delete("p1").await.unwrap();

        assert!(repo.get_by_id("p1").await.unwrap().is_none());
        assert_eq!(repo.count_variants().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_groups_variants_by_product() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert_with_variants(&product_with_variants("a", "pantry", &["1kg"]))
            .await
            .unwrap();
        repo.insert_with_variants(&product_with_variants("b", "pantry", &["1L", "5L"]))
            .await
            .unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);

        let a = all.iter().find(|p| p.id == "a").unwrap();
        let b = all.iter().find(|p| p.id == "b").unwrap();
        assert_eq!(a.variants.len(), 1);
        assert_eq!(b.variants.len(), 2);
    }
}
