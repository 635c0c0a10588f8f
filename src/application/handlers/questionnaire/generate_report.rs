//! ReportGenerator - Resolves a document instance and hands it to a renderer.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode, EventId};
use crate::domain::questionnaire::{Catalog, CompletionSummary, ProgressKey, ResponseMap};
use crate::ports::{
    DocumentRenderer, DocumentReport, RenderError, RenderReceipt, ReportEntry, ReportSection,
    ResponseStore,
};

use super::{CatalogResolver, ResponseMaterializer};

/// Errors from generating a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Builds sectioned [`DocumentReport`]s and renders them.
#[derive(Clone)]
pub struct ReportGenerator {
    store: Arc<dyn ResponseStore>,
    catalogs: CatalogResolver,
    materializer: ResponseMaterializer,
    renderer: Arc<dyn DocumentRenderer>,
}

impl ReportGenerator {
    pub fn new(store: Arc<dyn ResponseStore>, renderer: Arc<dyn DocumentRenderer>) -> Self {
        Self {
            catalogs: CatalogResolver::new(Arc::clone(&store)),
            materializer: ResponseMaterializer::new(Arc::clone(&store)),
            store,
            renderer,
        }
    }

    /// Resolves the document instance without rendering it.
    pub async fn build(&self, key: ProgressKey) -> Result<DocumentReport, DomainError> {
        self.ensure_event(key.event_id).await?;
        let document_name = self
            .catalogs
            .document_name(key.document_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::DocumentNotFound,
                    format!("Document {} not found", key.document_id),
                )
            })?;

        let catalog = self.catalogs.resolve(key.document_id).await?;
        let responses = self
            .materializer
            .load_or_initialize(key.event_id, key.document_id, key.scope, &catalog)
            .await?;

        let progress = CompletionSummary::evaluate(catalog.required(), &responses).percentage();
        Ok(DocumentReport {
            key,
            document_name,
            progress,
            sections: build_sections(&catalog, &responses),
        })
    }

    /// Resolves and renders; render failures are returned, never retried.
    pub async fn generate(&self, key: ProgressKey) -> Result<RenderReceipt, ReportError> {
        let report = self.build(key).await?;
        let receipt = self.renderer.render(&report).await?;
        info!(
            key = %key,
            location = %receipt.location,
            bytes = receipt.bytes_written,
            "Report generated"
        );
        Ok(receipt)
    }

    async fn ensure_event(&self, event_id: EventId) -> Result<(), DomainError> {
        let found = self
            .store
            .get("SELECT id FROM events WHERE id = ?", &[event_id.as_i64().into()])
            .await?;
        match found {
            Some(_) => Ok(()),
            None => Err(DomainError::new(
                ErrorCode::EventNotFound,
                format!("Event {} not found", event_id),
            )),
        }
    }
}

fn build_sections(catalog: &Catalog, responses: &ResponseMap) -> Vec<ReportSection> {
    catalog
        .sections()
        .into_iter()
        .map(|section| ReportSection {
            title: section.title.to_string(),
            entries: section
                .questions
                .into_iter()
                .filter_map(|question| {
                    responses.get(&question.field_name).map(|response| ReportEntry {
                        question: question.clone(),
                        options: catalog.options_for(&question.field_name).to_vec(),
                        response: response.clone(),
                    })
                })
                .collect(),
        })
        .collect()
}
