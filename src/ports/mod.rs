//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ResponseStore` - parametrised reads, writes and transactions on the relational store
//! - `ProgressNotifier` - best-effort delivery of recomputed progress to open views
//! - `DocumentRenderer` - rendering a resolved document and handing it to a sink

mod document_renderer;
mod progress_notifier;
mod response_store;

pub use document_renderer::{
    DocumentRenderer, DocumentReport, RenderError, RenderReceipt, ReportEntry, ReportSection,
};
pub use progress_notifier::ProgressNotifier;
pub use response_store::{ResponseStore, Row, SqlValue, Statement, WriteOutcome};
