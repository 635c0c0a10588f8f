//! ResponseStore port - Interface to the relational store.
//!
//! The engine speaks parametrised SQL through this port and never sees
//! the driver. Adapters translate [`SqlValue`] parameters and result rows.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};

/// A parameter or column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// One result row, columns addressed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: HashMap<String, SqlValue>,
}

impl Row {
    pub fn new(columns: HashMap<String, SqlValue>) -> Self {
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns.get(column)
    }

    /// Reads a non-null integer column.
    pub fn i64(&self, column: &str) -> Result<i64, DomainError> {
        self.opt_i64(column)?
            .ok_or_else(|| column_error(column, "is NULL"))
    }

    /// Reads a nullable integer column.
    pub fn opt_i64(&self, column: &str) -> Result<Option<i64>, DomainError> {
        match self.columns.get(column) {
            Some(SqlValue::Integer(v)) => Ok(Some(*v)),
            Some(SqlValue::Null) => Ok(None),
            Some(SqlValue::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| column_error(column, "is not an integer")),
            Some(SqlValue::Real(_)) => Err(column_error(column, "is not an integer")),
            None => Err(column_error(column, "is missing")),
        }
    }

    /// Reads an integer column as a boolean (non-zero is true).
    pub fn bool(&self, column: &str) -> Result<bool, DomainError> {
        Ok(self.opt_i64(column)?.unwrap_or(0) != 0)
    }

    /// Reads a text column; NULL reads as the empty string.
    pub fn text(&self, column: &str) -> Result<String, DomainError> {
        Ok(self.opt_text(column)?.unwrap_or_default())
    }

    /// Reads a nullable text column.
    pub fn opt_text(&self, column: &str) -> Result<Option<String>, DomainError> {
        match self.columns.get(column) {
            Some(SqlValue::Text(s)) => Ok(Some(s.clone())),
            Some(SqlValue::Integer(v)) => Ok(Some(v.to_string())),
            Some(SqlValue::Real(v)) => Ok(Some(v.to_string())),
            Some(SqlValue::Null) => Ok(None),
            None => Err(column_error(column, "is missing")),
        }
    }
}

fn column_error(column: &str, problem: &str) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Column '{}' {}", column, problem),
    )
    .with_detail("column", column)
}

/// Metadata returned by a single write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub inserted_id: Option<i64>,
    pub rows_affected: u64,
}

/// A statement queued for [`ResponseStore::transaction`].
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Port for the relational store backing responses and progress.
///
/// # Contract
///
/// - `query` returns every matching row, `get` the first or `None`
/// - `run` executes one write and reports affected rows / inserted id
/// - `transaction` applies all statements or none
/// - Failures are `ErrorCode::DatabaseError`
#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DomainError>;

    async fn get(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>, DomainError>;

    async fn run(&self, sql: &str, params: &[SqlValue]) -> Result<WriteOutcome, DomainError>;

    async fn transaction(&self, statements: Vec<Statement>) -> Result<(), DomainError>;
}
