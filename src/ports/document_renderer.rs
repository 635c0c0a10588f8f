//! DocumentRenderer port - Hand-off of a fully resolved document for rendering.
//!
//! Rendering (PDF templates, uploads) lives outside this crate. The engine
//! supplies a complete, well-formed [`DocumentReport`]; the renderer turns
//! it into bytes and stores them wherever it stores things.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::Percentage;
use crate::domain::questionnaire::{ProgressKey, Question, Response};

/// A document instance resolved into sections of question/answer pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub key: ProgressKey,
    pub document_name: String,
    pub progress: Percentage,
    pub sections: Vec<ReportSection>,
}

/// Questions sharing a section label, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub entries: Vec<ReportEntry>,
}

/// One question with its options and captured response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub question: Question,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub response: Response,
}

/// Where a rendered document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReceipt {
    pub location: String,
    pub bytes_written: u64,
    pub checksum: String,
}

/// Errors from rendering or storing a document.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Failed to serialize document: {0}")]
    Serialization(String),

    #[error("Failed to store rendered document: {0}")]
    Io(String),

    #[error("Renderer rejected document: {0}")]
    Rejected(String),
}

/// Port for rendering a resolved document and handing it to a sink.
///
/// Implementations must not retry; failures are returned to the caller,
/// which surfaces them to the user.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, report: &DocumentReport) -> Result<RenderReceipt, RenderError>;
}
