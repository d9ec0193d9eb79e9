//! # Order Repository
//!
//! Database operations for submitted orders.
//!
//! ## Order Persistence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       insert(order, lines)                              │
//! │                                                                         │
//! │  BEGIN TRANSACTION                                                      │
//! │       │                                                                 │
//! │       ├── INSERT orders row (status = 'pending')                       │
//! │       ├── INSERT order_items row 1                                     │
//! │       ├── ...                                                           │
//! │       └── INSERT order_items row N                                     │
//! │       │                                                                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  On failure nothing is visible: no half-persisted order exists for     │
//! │  the notification mail or the admin panel to pick up.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders are immutable once created; there are no update operations here.
//! `pending` is the only status the portal ever assigns.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use mercato_core::{Order, OrderLine};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order and all its lines atomically.
    ///
    /// ## Snapshot Pattern
    /// Line prices and names are the snapshots carried by the submitted
    /// cart; they are stored as-is and never re-derived from the catalog.
    pub async fn insert(&self, order: &Order, lines: &[OrderLine]) -> DbResult<()> {
        debug!(
            id = %order.id,
            user_id = %order.user_id,
            total = %order.total_cents,
            lines = lines.len(),
            "Inserting order"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, company_name, address, contact_number,
                tier, status, total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(&order.company_name)
        .bind(&order.address)
        .bind(&order.contact_number)
        .bind(order.tier)
        .bind(order.status)
        .bind(order.total_cents)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, product_name, variant_id,
                    size, unit_price_cents, quantity, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&line.id)
            .bind(&line.order_id)
            .bind(&line.product_id)
            .bind(&line.product_name)
            .bind(&line.variant_id)
            .bind(&line.size)
            .bind(line.unit_price_cents)
            .bind(line.quantity)
            .bind(line.line_total_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Gets an order by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, company_name, address, contact_number,
                   tier, status, total_cents, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all lines of an order, in insertion order.
    pub async fn lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT id, order_id, product_id, product_name, variant_id,
                   size, unit_price_cents, quantity, line_total_cents
            FROM order_items
            WHERE order_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists all orders with their lines, newest first.
    ///
    /// ## Usage
    /// Admin order review. Two queries, grouped in memory.
    pub async fn list_with_lines(&self) -> DbResult<Vec<(Order, Vec<OrderLine>)>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, company_name, address, contact_number,
                   tier, status, total_cents, created_at
            FROM orders
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let all_lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT id, order_id, product_id, product_name, variant_id,
                   size, unit_price_cents, quantity, line_total_cents
            FROM order_items
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let grouped = orders
            .into_iter()
            .map(|order| {
                let lines = all_lines
                    .iter()
                    .filter(|l| l.order_id == order.id)
                    .cloned()
                    .collect();
                (order, lines)
            })
            .collect();

        Ok(grouped)
    }

    /// Counts orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Generates a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new order line ID.
pub fn generate_order_line_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use mercato_core::{OrderStatus, PriceTier};

    fn sample_order(id: &str, total_cents: i64) -> Order {
        Order {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            company_name: "Trattoria Roma".to_string(),
            address: "Via Appia 12".to_string(),
            contact_number: "+39 06 555 0100".to_string(),
            tier: PriceTier::B,
            status: OrderStatus::Pending,
            total_cents,
            created_at: Utc::now(),
        }
    }

    fn sample_line(order_id: &str, n: usize, unit_cents: i64, qty: i64) -> OrderLine {
        OrderLine {
            id: format!("{}-l{}", order_id, n),
            order_id: order_id.to_string(),
            product_id: format!("p-{}", n),
            product_name: format!("Product {}", n),
            variant_id: format!("v-{}", n),
            size: "1kg".to_string(),
            unit_price_cents: unit_cents,
            quantity: qty,
            line_total_cents: unit_cents * qty,
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let order = sample_order("o-1", 2400);
        let lines = vec![
            sample_line("o-1", 1, 1050, 2), // €21.00
            sample_line("o-1", 2, 300, 1),  // €3.00
        ];
        repo.insert(&order, &lines).await.unwrap();

        let found = repo.get_by_id("o-1").await.unwrap().unwrap();
        assert_eq!(found.status, OrderStatus::Pending);
        assert_eq!(found.tier, PriceTier::B);
        assert_eq!(found.total_cents, 2400);

        let found_lines = repo.lines("o-1").await.unwrap();
        assert_eq!(found_lines.len(), 2);
        assert_eq!(found_lines[0].line_total_cents, 2100);
        assert_eq!(found_lines[1].line_total_cents, 300);
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_no_rows() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let order = sample_order("o-1", 1000);
        // Second line duplicates the first line's id: the insert fails
        // after the order row and one line row were already written.
        let mut lines = vec![sample_line("o-1", 1, 500, 1), sample_line("o-1", 2, 500, 1)];
        lines[1].id = lines[0].id.clone();

        assert!(repo.insert(&order, &lines).await.is_err());

        // The transaction rolled back: no order, no lines
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.lines("o-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_with_lines_groups_per_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        repo.insert(&sample_order("o-1", 500), &[sample_line("o-1", 1, 500, 1)])
            .await
            .unwrap();
        repo.insert(
            &sample_order("o-2", 900),
            &[
                sample_line("o-2", 1, 300, 1),
                sample_line("o-2", 2, 300, 2),
            ],
        )
        .await
        .unwrap();

        let all = repo.list_with_lines().await.unwrap();
        assert_eq!(all.len(), 2);

        let o2 = all.iter().find(|(o, _)| o.id == "o-2").unwrap();
        assert_eq!(o2.1.len(), 2);
    }
}
