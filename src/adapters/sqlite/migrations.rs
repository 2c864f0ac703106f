//! Small embedded migration runner.
//!
//! Grounded on the teacher's `adapters::sqlite::migrations::Migrator` /
//! `all_embedded_migrations()`, which embeds `.sql` files with
//! `include_str!` and tracks applied versions in a `schema_migrations`
//! table rather than depending on an external migration tool at runtime.

use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration {version} failed: {source}")]
    Apply { version: i64, source: sqlx::Error },

    #[error("failed to query schema_migrations: {0}")]
    Query(#[from] sqlx::Error),
}

pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

/// All migrations embedded at compile time, in ascending version order.
pub fn all_embedded_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        name: "initial_schema",
        sql: include_str!("../../../migrations/0001_initial_schema.sql"),
    }]
}

pub struct Migrator<'a> {
    pool: &'a SqlitePool,
}

impl<'a> Migrator<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run(&self) -> Result<(), MigrationError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (version INTEGER PRIMARY KEY, applied_at TEXT NOT NULL DEFAULT (datetime('now')))",
        )
        .execute(self.pool)
        .await?;

        for migration in all_embedded_migrations() {
            let already_applied: Option<i64> =
                sqlx::query_scalar("SELECT version FROM schema_migrations WHERE version = ?")
                    .bind(migration.version)
                    .fetch_optional(self.pool)
                    .await?;
            if already_applied.is_some() {
                continue;
            }

            sqlx::raw_sql(migration.sql)
                .execute(self.pool)
                .await
                .map_err(|source| MigrationError::Apply { version: migration.version, source })?;

            sqlx::query("INSERT INTO schema_migrations (version) VALUES (?)")
                .bind(migration.version)
                .execute(self.pool)
                .await?;

            tracing::debug!(version = migration.version, name = migration.name, "applied migration");
        }
        Ok(())
    }
}
