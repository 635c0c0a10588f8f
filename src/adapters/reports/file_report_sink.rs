//! File report sink - Implementation of DocumentRenderer.
//!
//! Writes a JSON or YAML snapshot of a resolved document. The snapshot is
//! the hand-off point for PDF rendering and upload, which run elsewhere.
//! Uses atomic writes and SHA-256 checksums for data integrity.

use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::config::ReportFormat;
use crate::domain::foundation::TraineeScope;
use crate::ports::{DocumentRenderer, DocumentReport, RenderError, RenderReceipt};

/// Local filesystem sink for document reports.
///
/// # Directory Structure
///
/// ```text
/// {base_path}/
/// ├── event_4/
/// │   ├── document_2_trainee_9.json
/// │   └── document_3_event.json
/// └── event_5/
///     └── document_2_trainee_1.json
/// ```
///
/// # Atomic Writes
///
/// Content goes to `{name}.tmp`, is synced, then renamed into place, so a
/// crash mid-write never leaves a truncated report behind.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    base_path: PathBuf,
    format: ReportFormat,
}

impl FileReportSink {
    pub fn new(base_path: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            base_path: base_path.into(),
            format,
        }
    }

    /// Final path of the report for `report`'s document instance.
    pub fn report_path(&self, report: &DocumentReport) -> PathBuf {
        let scope = match report.key.scope {
            TraineeScope::Trainee(id) => format!("trainee_{}", id),
            TraineeScope::WholeEvent => "event".to_string(),
        };
        self.base_path
            .join(format!("event_{}", report.key.event_id))
            .join(format!(
                "document_{}_{}.{}",
                report.key.document_id,
                scope,
                self.format.extension()
            ))
    }

    fn serialize(&self, report: &DocumentReport) -> Result<String, RenderError> {
        match self.format {
            ReportFormat::Json => serde_json::to_string_pretty(report)
                .map_err(|e| RenderError::Serialization(e.to_string())),
            ReportFormat::Yaml => {
                serde_yaml::to_string(report).map_err(|e| RenderError::Serialization(e.to_string()))
            }
        }
    }

    fn compute_checksum(content: &[u8]) -> String {
        format!("{:x}", Sha256::digest(content))
    }
}

#[async_trait]
impl DocumentRenderer for FileReportSink {
    async fn render(&self, report: &DocumentReport) -> Result<RenderReceipt, RenderError> {
        let content = self.serialize(report)?;
        let final_path = self.report_path(report);
        let temp_path = final_path.with_extension(format!("{}.tmp", self.format.extension()));

        if let Some(dir) = final_path.parent() {
            fs::create_dir_all(dir).await.map_err(|e| {
                RenderError::Io(format!("Failed to create directory {}: {}", dir.display(), e))
            })?;
        }

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            RenderError::Io(format!("Failed to create temp file {}: {}", temp_path.display(), e))
        })?;

        file.write_all(content.as_bytes()).await.map_err(|e| {
            RenderError::Io(format!("Failed to write to temp file {}: {}", temp_path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            RenderError::Io(format!("Failed to sync temp file {}: {}", temp_path.display(), e))
        })?;

        fs::rename(&temp_path, &final_path).await.map_err(|e| {
            RenderError::Io(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                final_path.display(),
                e
            ))
        })?;

        let receipt = RenderReceipt {
            location: final_path.display().to_string(),
            bytes_written: content.len() as u64,
            checksum: Self::compute_checksum(content.as_bytes()),
        };
        info!(key = %report.key, location = %receipt.location, "Report written");
        Ok(receipt)
    }
}
