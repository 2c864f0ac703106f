//! SQLite connection pool setup: WAL mode, busy timeout, foreign keys on.
//!
//! Grounded on the teacher's `adapters::sqlite::connection::create_pool` /
//! `ensure_database_directory` / `verify_connection`.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to create database directory {path}: {source}")]
    DirectoryCreate { path: String, source: std::io::Error },

    #[error("failed to connect to sqlite database: {0}")]
    Connect(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub busy_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_connections: 5, busy_timeout: Duration::from_secs(5) }
    }
}

/// Create a pooled connection to a file-backed sqlite database, creating
/// the parent directory and the database file if absent, with WAL mode,
/// a busy timeout, and foreign keys enabled.
pub async fn create_pool(path: &str, config: &PoolConfig) -> Result<SqlitePool, ConnectionError> {
    ensure_database_directory(path)?;

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(config.busy_timeout)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().max_connections(config.max_connections).connect_with(options).await?;
    verify_connection(&pool).await?;
    Ok(pool)
}

/// In-memory sqlite pool used by tests that want relational semantics
/// without a file on disk.
pub async fn create_test_pool() -> Result<SqlitePool, ConnectionError> {
    let options = SqliteConnectOptions::new()
        .filename(":memory:")
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Memory)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;
    verify_connection(&pool).await?;
    Ok(pool)
}

fn ensure_database_directory(path: &str) -> Result<(), ConnectionError> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|source| ConnectionError::DirectoryCreate { path: path.to_string(), source })?;
        }
    }
    Ok(())
}

async fn verify_connection(pool: &SqlitePool) -> Result<(), ConnectionError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
