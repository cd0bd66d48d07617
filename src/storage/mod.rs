//! # Storage and Persistence
//!
//! Database connectivity and the persistence layer for account and
//! classification data.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool};
pub use repositories::{
    AccountRepository, ClassificationRepository, SqlxAccountRepository,
    SqlxClassificationRepository,
};

use crate::errors::{MotorlotError, Result};

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| MotorlotError::Database {
        source: e,
        context: "Database connectivity check failed".to_string(),
    })?;

    Ok(())
}
