//! SQLite implementation of ResponseStore.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row as _, Sqlite, SqlitePool, TypeInfo, ValueRef};

use crate::domain::foundation::DomainError;
use crate::ports::{ResponseStore, Row, SqlValue, Statement, WriteOutcome};

/// SQLite implementation of ResponseStore.
#[derive(Clone)]
pub struct SqliteResponseStore {
    pool: SqlitePool,
}

impl SqliteResponseStore {
    /// Creates a new SqliteResponseStore.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ResponseStore for SqliteResponseStore {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DomainError> {
        let rows = bind_params(sqlx::query(sql), params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to run query", e))?;

        rows.iter().map(convert_row).collect()
    }

    async fn get(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>, DomainError> {
        let row = bind_params(sqlx::query(sql), params)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch row", e))?;

        row.as_ref().map(convert_row).transpose()
    }

    async fn run(&self, sql: &str, params: &[SqlValue]) -> Result<WriteOutcome, DomainError> {
        let result = bind_params(sqlx::query(sql), params)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to execute statement", e))?;

        let is_insert = sql
            .trim_start()
            .get(..6)
            .is_some_and(|verb| verb.eq_ignore_ascii_case("insert"));
        let inserted_id = (is_insert && result.rows_affected() > 0)
            .then(|| result.last_insert_rowid());

        Ok(WriteOutcome {
            inserted_id,
            rows_affected: result.rows_affected(),
        })
    }

    async fn transaction(&self, statements: Vec<Statement>) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        // Dropping `tx` on an early return rolls everything back.
        for statement in &statements {
            bind_params(sqlx::query(&statement.sql), &statement.params)
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::database("Failed to execute statement in transaction", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<i64>),
            SqlValue::Integer(v) => query.bind(*v),
            SqlValue::Real(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
        };
    }
    query
}

/// Reads each column by its runtime storage class.
fn convert_row(row: &SqliteRow) -> Result<Row, DomainError> {
    let mut columns = HashMap::with_capacity(row.columns().len());

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row
            .try_get_raw(index)
            .map_err(|e| DomainError::database("Failed to read column", e))?;

        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            let storage = raw.type_info().name().to_ascii_uppercase();
            match storage.as_str() {
                "INTEGER" | "BOOLEAN" => SqlValue::Integer(
                    row.try_get_unchecked::<i64, _>(index)
                        .map_err(|e| DomainError::database("Failed to decode integer", e))?,
                ),
                "REAL" => SqlValue::Real(
                    row.try_get_unchecked::<f64, _>(index)
                        .map_err(|e| DomainError::database("Failed to decode real", e))?,
                ),
                "BLOB" => {
                    let bytes = row
                        .try_get_unchecked::<Vec<u8>, _>(index)
                        .map_err(|e| DomainError::database("Failed to decode blob", e))?;
                    SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())
                }
                _ => SqlValue::Text(
                    row.try_get_unchecked::<String, _>(index)
                        .map_err(|e| DomainError::database("Failed to decode text", e))?,
                ),
            }
        };

        columns.insert(column.name().to_string(), value);
    }

    Ok(Row::new(columns))
}
