//! # Database Migration Management
//!
//! Schema evolution using SQL migrations embedded in the binary and executed
//! automatically on startup when `auto_migrate` is enabled.

use crate::errors::{MotorlotError, Result};
use crate::storage::DbPool;
use tracing::{debug, info};

/// Embedded migrations, applied in order. The name doubles as the version
/// key recorded in `schema_migrations`.
const MIGRATIONS: &[(&str, &str)] = &[
    ("0001_create_accounts", include_str!("../../migrations/0001_create_accounts.sql")),
    ("0002_create_classifications", include_str!("../../migrations/0002_create_classifications.sql")),
];

/// Run all pending migrations against the given pool.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| MotorlotError::Database {
        source: e,
        context: "Failed to create schema_migrations table".to_string(),
    })?;

    let mut applied = 0usize;
    for (version, sql) in MIGRATIONS {
        if migration_applied(pool, version).await? {
            debug!(version, "Migration already applied, skipping");
            continue;
        }

        sqlx::raw_sql(sql).execute(pool).await.map_err(|e| MotorlotError::Database {
            source: e,
            context: format!("Failed to apply migration '{}'", version),
        })?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES ($1, $2)")
            .bind(version)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(pool)
            .await
            .map_err(|e| MotorlotError::Database {
                source: e,
                context: format!("Failed to record migration '{}'", version),
            })?;

        info!(version, "Applied database migration");
        applied += 1;
    }

    if applied > 0 {
        info!(count = applied, "Database migrations completed");
    }

    Ok(())
}

async fn migration_applied(pool: &DbPool, version: &str) -> Result<bool> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT version FROM schema_migrations WHERE version = $1")
            .bind(version)
            .fetch_optional(pool)
            .await
            .map_err(|e| MotorlotError::Database {
                source: e,
                context: "Failed to query schema_migrations".to_string(),
            })?;

    Ok(row.is_some())
}
