//! SQLite adapters - the relational store behind the engine.
//!
//! - `SqliteResponseStore` implements `ResponseStore` over a `SqlitePool`
//! - `init_database` opens the pool and applies the schema

mod schema;
mod store;

pub use schema::apply_schema;
pub use store::SqliteResponseStore;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::domain::foundation::DomainError;

/// Opens the database described by `config` and makes sure the schema exists.
pub async fn init_database(config: &DatabaseConfig) -> Result<SqlitePool, DomainError> {
    let pool = connect(config).await?;
    apply_schema(&pool).await?;
    info!(path = %config.path, "Database ready");
    Ok(pool)
}

/// Opens a connection pool without touching the schema.
///
/// An in-memory database lives only as long as its single connection,
/// so the pool never recycles it.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DomainError> {
    let busy_timeout = Duration::from_millis(config.busy_timeout_ms);

    if config.is_in_memory() {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DomainError::database("Invalid in-memory database options", e))?
            .foreign_keys(true)
            .busy_timeout(busy_timeout);
        return SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DomainError::database("Failed to open in-memory database", e));
    }

    if let Some(parent) = std::path::Path::new(&config.path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::database(
                    &format!("Failed to create database directory {}", parent.display()),
                    e,
                )
            })?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(busy_timeout);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| DomainError::database(&format!("Failed to open database {}", config.path), e))
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    connect(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database")
}
