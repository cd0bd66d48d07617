//! Account repository.
//!
//! CRUD operations for account records. The UNIQUE index on `email` is the
//! authoritative arbiter for duplicate-email races: violations are mapped to
//! [`MotorlotError::Conflict`] so the flow layer can surface them as
//! field-level errors.

use crate::auth::account::{Account, AccountRole, NewAccount, ProfileChanges};
use crate::domain::AccountId;
use crate::errors::{MotorlotError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct AccountRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const ACCOUNT_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, role, created_at, updated_at";

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account with role Client. The store assigns the id.
    async fn insert(&self, account: NewAccount) -> Result<Account>;

    /// Get an account by id
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>>;

    /// Get an account by (normalized) email
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Get an account with its password hash for credential verification
    async fn find_with_password(&self, email: &str) -> Result<Option<(Account, String)>>;

    /// Update names and email. Role is never touched here.
    async fn update_profile(&self, id: &AccountId, changes: ProfileChanges) -> Result<Account>;

    /// Replace the stored password hash
    async fn update_password_hash(&self, id: &AccountId, password_hash: String) -> Result<()>;

    /// True when any account uses the email
    async fn email_in_use(&self, email: &str) -> Result<bool>;

    /// True when an account *other than* `id` uses the email
    async fn email_in_use_by_other(&self, email: &str, id: &AccountId) -> Result<bool>;
}

/// SQLite-backed account repository.
#[derive(Debug, Clone)]
pub struct SqlxAccountRepository {
    pool: DbPool,
}

impl SqlxAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn row_to_account(&self, row: AccountRow) -> Result<Account> {
        let role = AccountRole::from_str(&row.role).map_err(|_| {
            MotorlotError::validation(format!("Unknown account role '{}'", row.role))
        })?;

        Ok(Account {
            id: AccountId::from_string(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Translate a write error, promoting unique-index violations to Conflict.
fn map_write_err(err: sqlx::Error, context: &str) -> MotorlotError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return MotorlotError::conflict("Email is already registered", "account");
        }
    }
    MotorlotError::Database { source: err, context: context.to_string() }
}

#[async_trait]
impl AccountRepository for SqlxAccountRepository {
    #[instrument(skip(self, account), fields(account_email = %account.email), name = "db_insert_account")]
    async fn insert(&self, account: NewAccount) -> Result<Account> {
        let id = AccountId::new();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO accounts (id, first_name, last_name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id.as_str())
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(AccountRole::Client.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_err(err, "Failed to insert account"))?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| MotorlotError::internal("Account not found after insert"))
    }

    #[instrument(skip(self), fields(account_id = %id), name = "db_find_account")]
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| MotorlotError::Database {
            source: err,
            context: "Failed to fetch account".to_string(),
        })?;

        row.map(|r| self.row_to_account(r)).transpose()
    }

    #[instrument(skip(self, email), name = "db_find_account_by_email")]
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE email = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| MotorlotError::Database {
            source: err,
            context: "Failed to fetch account by email".to_string(),
        })?;

        row.map(|r| self.row_to_account(r)).transpose()
    }

    #[instrument(skip(self, email), name = "db_find_account_with_password")]
    async fn find_with_password(&self, email: &str) -> Result<Option<(Account, String)>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE email = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| MotorlotError::Database {
            source: err,
            context: "Failed to fetch account credentials".to_string(),
        })?;

        if let Some(row) = row {
            let password_hash = row.password_hash.clone();
            let account = self.row_to_account(row)?;
            Ok(Some((account, password_hash)))
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self, changes), fields(account_id = %id), name = "db_update_profile")]
    async fn update_profile(&self, id: &AccountId, changes: ProfileChanges) -> Result<Account> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET first_name = $1, last_name = $2, email = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| map_write_err(err, "Failed to update account profile"))?;

        if result.rows_affected() == 0 {
            return Err(MotorlotError::not_found("Account", id.to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| MotorlotError::not_found("Account", id.to_string()))
    }

    #[instrument(skip(self, password_hash), fields(account_id = %id), name = "db_update_password")]
    async fn update_password_hash(&self, id: &AccountId, password_hash: String) -> Result<()> {
        let result = sqlx::query(
            "UPDATE accounts SET password_hash = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(&password_hash)
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| MotorlotError::Database {
            source: err,
            context: "Failed to update password hash".to_string(),
        })?;

        if result.rows_affected() == 0 {
            return Err(MotorlotError::not_found("Account", id.to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self, email), name = "db_email_in_use")]
    async fn email_in_use(&self, email: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM accounts WHERE email = $1 LIMIT 1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| MotorlotError::Database {
                source: err,
                context: "Failed to check email usage".to_string(),
            })?;

        Ok(row.is_some())
    }

    #[instrument(skip(self, email), fields(account_id = %id), name = "db_email_in_use_by_other")]
    async fn email_in_use_by_other(&self, email: &str, id: &AccountId) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM accounts WHERE email = $1 AND id != $2 LIMIT 1")
                .bind(email)
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| MotorlotError::Database {
                    source: err,
                    context: "Failed to check email usage".to_string(),
                })?;

        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::storage::create_pool;

    async fn test_repo() -> SqlxAccountRepository {
        let config = DatabaseConfig {
            url: "sqlite://:memory:".to_string(),
            max_connections: 1,
            auto_migrate: true,
            ..Default::default()
        };
        let pool = create_pool(&config).await.expect("create pool");
        SqlxAccountRepository::new(pool)
    }

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            first_name: "Jo".into(),
            last_name: "Doe".into(),
            email: email.into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".into(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_client_role() {
        let repo = test_repo().await;
        let account = repo.insert(new_account("jo@example.com")).await.unwrap();

        assert_eq!(account.role, AccountRole::Client);
        assert_eq!(account.email, "jo@example.com");

        let fetched = repo.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, account.id);
    }

    #[tokio::test]
    async fn duplicate_email_insert_is_a_conflict() {
        let repo = test_repo().await;
        repo.insert(new_account("jo@example.com")).await.unwrap();

        let err = repo.insert(new_account("jo@example.com")).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn distinct_emails_get_distinct_ids() {
        let repo = test_repo().await;
        let first = repo.insert(new_account("a@example.com")).await.unwrap();
        let second = repo.insert(new_account("b@example.com")).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn update_profile_conflicts_on_taken_email() {
        let repo = test_repo().await;
        repo.insert(new_account("taken@example.com")).await.unwrap();
        let account = repo.insert(new_account("mine@example.com")).await.unwrap();

        let err = repo
            .update_profile(
                &account.id,
                ProfileChanges {
                    first_name: "Jo".into(),
                    last_name: "Doe".into(),
                    email: "taken@example.com".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // Keeping its own email is never a conflict.
        let updated = repo
            .update_profile(
                &account.id,
                ProfileChanges {
                    first_name: "Joan".into(),
                    last_name: "Doe".into(),
                    email: "mine@example.com".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Joan");
    }

    #[tokio::test]
    async fn email_usage_checks() {
        let repo = test_repo().await;
        let account = repo.insert(new_account("jo@example.com")).await.unwrap();

        assert!(repo.email_in_use("jo@example.com").await.unwrap());
        assert!(!repo.email_in_use("other@example.com").await.unwrap());

        assert!(!repo.email_in_use_by_other("jo@example.com", &account.id).await.unwrap());
        let other = repo.insert(new_account("other@example.com")).await.unwrap();
        assert!(repo.email_in_use_by_other("jo@example.com", &other.id).await.unwrap());
    }

    #[tokio::test]
    async fn update_password_hash_requires_existing_account() {
        let repo = test_repo().await;
        let missing = AccountId::new();
        let err = repo.update_password_hash(&missing, "hash".into()).await.unwrap_err();
        assert!(matches!(err, MotorlotError::NotFound { .. }));

        let account = repo.insert(new_account("jo@example.com")).await.unwrap();
        repo.update_password_hash(&account.id, "new-hash".into()).await.unwrap();

        let (_, hash) = repo.find_with_password("jo@example.com").await.unwrap().unwrap();
        assert_eq!(hash, "new-hash");
    }
}
