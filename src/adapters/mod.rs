//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `sqlite` - Relational store (sqlx SQLite)
//! - `notifications` - In-process progress observer registry
//! - `reports` - Filesystem sink for resolved documents

pub mod notifications;
pub mod reports;
pub mod sqlite;

pub use notifications::{ProgressRegistry, ProgressSubscription};
pub use reports::FileReportSink;
pub use sqlite::{apply_schema, init_database, SqliteResponseStore};
