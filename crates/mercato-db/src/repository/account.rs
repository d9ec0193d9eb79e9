//! # Account Repository
//!
//! Database operations for customer and administrator accounts.
//!
//! The password hash column stores argon2 PHC strings produced by the API
//! layer; this repository treats them as opaque text.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use mercato_core::Account;

const ACCOUNT_COLUMNS: &str = r#"
    id, username, password_hash, tier, company_name,
    address, contact_number, email, is_admin, created_at
"#;

/// Repository for account database operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Gets an account by login name.
    ///
    /// ## Usage
    /// The login flow; callers must not reveal whether the account
    /// existed when authentication fails.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Gets an account by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Lists all accounts sorted by username.
    pub async fn list(&self) -> DbResult<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY username"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    /// Inserts a new account.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Username already taken
    pub async fn insert(&self, account: &Account) -> DbResult<()> {
        debug!(id = %account.id, username = %account.username, "Inserting account");

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, username, password_hash, tier, company_name,
                address, contact_number, email, is_admin, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.tier)
        .bind(&account.company_name)
        .bind(&account.address)
        .bind(&account.contact_number)
        .bind(&account.email)
        .bind(account.is_admin)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes an account.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Account doesn't exist
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting account");

        let result = sqlx::query("DELETE FROM accounts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }

        Ok(())
    }

    /// Counts accounts (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new account ID.
pub fn generate_account_id() -> String {
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
    use mercato_core::PriceTier;

    fn account(id: &str, username: &str, tier: PriceTier, is_admin: bool) -> Account {
        Account {
            id: id.to_string(),
            username: username.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            tier,
            company_name: format!("Company {}", username),
            address: Some("Via Roma 1".to_string()),
            contact_number: None,
            email: Some(format!("{}@example.com", username)),
            is_admin,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_by_username() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.accounts();

        repo.insert(&account("u1", "trattoria", PriceTier::B, false))
            .await
            .unwrap();

        let found = repo.get_by_username("trattoria").await.unwrap().unwrap();
        assert_eq!(found.id, "u1");
        assert_eq!(found.tier, PriceTier::B);
        assert!(!found.is_admin);
        assert_eq!(found.contact_number, None);

        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.accounts();

        repo.insert(&account("u1", "trattoria", PriceTier::A, false))
            .await
            .unwrap();
        let err = repo
            .insert(&account("u2", "trattoria", PriceTier::C, false))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_sorted_by_username() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.accounts();

        repo.insert(&account("u1", "zucchini", PriceTier::A, false))
            .await
            .unwrap();
        repo.insert(&account("u2", "admin", PriceTier::A, true))
            .await
            .unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].username, "admin");
        assert!(all[0].is_admin);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.accounts();

        repo.insert(&account("u1", "trattoria", PriceTier::B, false))
            .await
            .unwrap();
        repo.delete("u1").await.unwrap();

        assert!(repo.get_by_id("u1").await.unwrap().is_none());

        let err = repo.delete("u1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
