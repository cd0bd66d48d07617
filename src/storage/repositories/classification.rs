//! Classification lookups.
//!
//! The catalog CRUD lives outside this service; the only read it needs here
//! is existence of a classification reference during vehicle intake
//! validation.

use crate::errors::{MotorlotError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use tracing::instrument;

#[async_trait]
pub trait ClassificationRepository: Send + Sync {
    /// True when a classification with the given id exists
    async fn exists(&self, id: i64) -> Result<bool>;
}

/// SQLite-backed classification repository.
#[derive(Debug, Clone)]
pub struct SqlxClassificationRepository {
    pool: DbPool,
}

impl SqlxClassificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClassificationRepository for SqlxClassificationRepository {
    #[instrument(skip(self), name = "db_classification_exists")]
    async fn exists(&self, id: i64) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM classifications WHERE id = $1 LIMIT 1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| MotorlotError::Database {
                    source: err,
                    context: "Failed to check classification".to_string(),
                })?;

        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::storage::create_pool;

    #[tokio::test]
    async fn seeded_classifications_exist() {
        let config = DatabaseConfig {
            url: "sqlite://:memory:".to_string(),
            max_connections: 1,
            auto_migrate: true,
            ..Default::default()
        };
        let pool = create_pool(&config).await.unwrap();
        let repo = SqlxClassificationRepository::new(pool);

        assert!(repo.exists(1).await.unwrap());
        assert!(!repo.exists(9999).await.unwrap());
    }
}
