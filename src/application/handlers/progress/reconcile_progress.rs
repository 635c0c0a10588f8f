//! ProgressReconciler - Rebuilds stored progress from stored responses.
//!
//! Progress rows can fall behind when responses are edited outside the
//! engine (imports, manual fixes). Reconciliation recomputes every
//! document instance that has at least one response.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DocumentId, DomainError, EventId, TraineeScope};
use crate::domain::questionnaire::ProgressKey;
use crate::ports::ResponseStore;

use super::CompletionEngine;

const INSTANCES_SQL: &str = r#"
    SELECT DISTINCT event_id, document_id, trainee_id
    FROM responses
    ORDER BY event_id, document_id, trainee_id
"#;

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub recomputed: usize,
    /// Instances whose event or document no longer exists.
    pub skipped: usize,
}

/// Recomputes progress for every document instance with responses.
pub struct ProgressReconciler {
    store: Arc<dyn ResponseStore>,
    engine: Arc<CompletionEngine>,
}

impl ProgressReconciler {
    pub fn new(store: Arc<dyn ResponseStore>, engine: Arc<CompletionEngine>) -> Self {
        Self { store, engine }
    }

    pub async fn reconcile(&self) -> Result<ReconcileSummary, DomainError> {
        let rows = self.store.query(INSTANCES_SQL, &[]).await?;
        let mut summary = ReconcileSummary::default();

        for row in &rows {
            let key = ProgressKey::new(
                EventId::new(row.i64("event_id")?),
                DocumentId::new(row.i64("document_id")?),
                TraineeScope::from_response_column(row.i64("trainee_id")?),
            );
            match self.engine.recompute(key).await? {
                Some(_) => summary.recomputed += 1,
                None => summary.skipped += 1,
            }
        }

        info!(
            recomputed = summary.recomputed,
            skipped = summary.skipped,
            "Progress reconciliation finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notifications::ProgressRegistry;
    use crate::application::handlers::test_support::TestDb;
    use crate::domain::foundation::{Percentage, TraineeId};

    #[tokio::test]
    async fn every_instance_with_responses_gets_a_progress_row() {
        let db = TestDb::new().await;
        db.document(1, "Checklist").await;
        db.event(1, None).await;
        db.question(1, "notes", "text", 1, true).await;
        db.exec(
            "INSERT INTO responses (event_id, document_id, field_name, trainee_id, value) VALUES \
             (1, 1, 'notes', 3, 'done'), (1, 1, 'notes', 4, ''), (1, 1, 'notes', -1, 'x')",
        )
        .await;
        let engine = Arc::new(CompletionEngine::new(db.store(), Arc::new(ProgressRegistry::new())));
        let reconciler = ProgressReconciler::new(db.store(), Arc::clone(&engine));

        let summary = reconciler.reconcile().await.unwrap();

        assert_eq!(summary, ReconcileSummary { recomputed: 3, skipped: 0 });
        let trainee = ProgressKey::new(
            EventId::new(1),
            DocumentId::new(1),
            TraineeScope::Trainee(TraineeId::new(3)),
        );
        let record = engine.progress_for(&trainee).await.unwrap().unwrap();
        assert_eq!(record.progress, Percentage::HUNDRED);
        let records = engine.progress_for_event(EventId::new(1)).await.unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn orphaned_documents_are_skipped() {
        let db = TestDb::new().await;
        db.document(1, "Checklist").await;
        db.document(2, "Retired").await;
        db.event(1, None).await;
        db.question(1, "notes", "text", 1, true).await;
        db.exec("INSERT INTO responses (event_id, document_id, field_name) VALUES (1, 1, 'notes'), (1, 2, 'old')")
            .await;
        db.exec("PRAGMA foreign_keys = OFF").await;
        db.exec("DELETE FROM documents WHERE id = 2").await;
        let engine = Arc::new(CompletionEngine::new(db.store(), Arc::new(ProgressRegistry::new())));

        let summary = ProgressReconciler::new(db.store(), engine).reconcile().await.unwrap();

        assert_eq!(summary, ReconcileSummary { recomputed: 1, skipped: 1 });
    }
}
