//! CompletionEngine - Recomputes and stores a document instance's progress.
//!
//! # Steps
//!
//! 1. Check that the event and document still exist (otherwise: log, stop)
//! 2. Load the catalog; nothing required means 100%
//! 3. Load (initializing) the responses and count complete required questions
//! 4. Upsert the progress row (one row per key, whole-event scope included)
//! 5. Notify observers of that exact document instance

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::handlers::questionnaire::{CatalogResolver, ResponseMaterializer};
use crate::domain::foundation::{
    DocumentId, DomainError, EventId, Percentage, Timestamp, TraineeScope,
};
use crate::domain::questionnaire::{CompletionSummary, ProgressKey, ProgressRecord};
use crate::ports::{ProgressNotifier, ResponseStore, Row};

// Conflict target matches idx_progress_unique_key.
const UPSERT_PROGRESS_SQL: &str = r#"
    INSERT INTO document_progress (event_id, document_id, trainee_id, progress, updated_at)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT (event_id, document_id, IFNULL(trainee_id, -1))
    DO UPDATE SET progress = excluded.progress, updated_at = excluded.updated_at
"#;

const READ_PROGRESS_SQL: &str = r#"
    SELECT event_id, document_id, trainee_id, progress, updated_at
    FROM document_progress
    WHERE event_id = ? AND document_id = ? AND trainee_id IS ?
"#;

const EVENT_PROGRESS_SQL: &str = r#"
    SELECT event_id, document_id, trainee_id, progress, updated_at
    FROM document_progress
    WHERE event_id = ?
    ORDER BY document_id, trainee_id
"#;

/// Computes completion percentages and keeps `document_progress` current.
#[derive(Clone)]
pub struct CompletionEngine {
    store: Arc<dyn ResponseStore>,
    catalogs: CatalogResolver,
    materializer: ResponseMaterializer,
    notifier: Arc<dyn ProgressNotifier>,
}

impl CompletionEngine {
    pub fn new(store: Arc<dyn ResponseStore>, notifier: Arc<dyn ProgressNotifier>) -> Self {
        Self {
            catalogs: CatalogResolver::new(Arc::clone(&store)),
            materializer: ResponseMaterializer::new(Arc::clone(&store)),
            store,
            notifier,
        }
    }

    /// Recomputes progress for `key`, stores it and notifies observers.
    ///
    /// Returns `None` without touching anything when the event or the
    /// document no longer exists.
    pub async fn recompute(&self, key: ProgressKey) -> Result<Option<Percentage>, DomainError> {
        if !self.materializer.event_exists(key.event_id).await? {
            warn!(%key, "Event not found, progress not updated");
            return Ok(None);
        }
        if !self.catalogs.document_exists(key.document_id).await? {
            warn!(%key, "Document not found, progress not updated");
            return Ok(None);
        }

        let catalog = self.catalogs.resolve(key.document_id).await?;
        let progress = if catalog.required().next().is_none() {
            Percentage::HUNDRED
        } else {
            let responses = self
                .materializer
                .load_or_initialize(key.event_id, key.document_id, key.scope, &catalog)
                .await?;
            let summary = CompletionSummary::evaluate(catalog.required(), &responses);
            debug!(
                %key,
                required = summary.required_count(),
                completed = summary.completed_count(),
                "Evaluated required questions"
            );
            summary.percentage()
        };

        self.store_progress(&key, progress).await?;
        info!(%key, %progress, "Progress recomputed");

        self.notifier.publish(&key, progress);
        Ok(Some(progress))
    }

    async fn store_progress(&self, key: &ProgressKey, progress: Percentage) -> Result<(), DomainError> {
        self.store
            .run(
                UPSERT_PROGRESS_SQL,
                &[
                    key.event_id.as_i64().into(),
                    key.document_id.as_i64().into(),
                    key.scope.progress_column().into(),
                    i64::from(progress.value()).into(),
                    Timestamp::now().to_rfc3339().into(),
                ],
            )
            .await?;
        Ok(())
    }

    /// Stored progress of one document instance, if ever computed.
    pub async fn progress_for(&self, key: &ProgressKey) -> Result<Option<ProgressRecord>, DomainError> {
        self.store
            .get(
                READ_PROGRESS_SQL,
                &[
                    key.event_id.as_i64().into(),
                    key.document_id.as_i64().into(),
                    key.scope.progress_column().into(),
                ],
            )
            .await?
            .map(|row| row_to_record(&row))
            .transpose()
    }

    /// Every stored progress record of an event.
    pub async fn progress_for_event(&self, event_id: EventId) -> Result<Vec<ProgressRecord>, DomainError> {
        self.store
            .query(EVENT_PROGRESS_SQL, &[event_id.as_i64().into()])
            .await?
            .iter()
            .map(row_to_record)
            .collect()
    }
}

fn row_to_record(row: &Row) -> Result<ProgressRecord, DomainError> {
    let stored = row.i64("progress")?;
    let progress = Percentage::try_new(stored).unwrap_or_else(|_| {
        warn!(stored, "Stored progress out of range, clamping");
        Percentage::new(stored.clamp(0, 100) as u8)
    });

    Ok(ProgressRecord {
        key: ProgressKey::new(
            EventId::new(row.i64("event_id")?),
            DocumentId::new(row.i64("document_id")?),
            TraineeScope::from_progress_column(row.opt_i64("trainee_id")?),
        ),
        progress,
        updated_at: Timestamp::parse_rfc3339(&row.text("updated_at")?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notifications::ProgressRegistry;
    use crate::application::handlers::test_support::TestDb;
    use crate::domain::foundation::TraineeId;
    use std::sync::Mutex;

    const EVENT: EventId = EventId::new(1);
    const DOCUMENT: DocumentId = DocumentId::new(1);

    fn engine(db: &TestDb, registry: &ProgressRegistry) -> CompletionEngine {
        CompletionEngine::new(db.store(), Arc::new(registry.clone()))
    }

    fn key(scope: TraineeScope) -> ProgressKey {
        ProgressKey::new(EVENT, DOCUMENT, scope)
    }

    async fn seven_required(db: &TestDb) {
        db.document(1, "Checklist").await;
        db.event(1, None).await;
        for i in 1..=7 {
            db.question(1, &format!("q{}", i), "text", i, true).await;
        }
        db.question(1, "optional", "text", 8, false).await;
    }

    #[tokio::test]
    async fn three_of_seven_is_43_percent() {
        let db = TestDb::new().await;
        seven_required(&db).await;
        let registry = ProgressRegistry::new();
        let engine = engine(&db, &registry);
        let scope = TraineeScope::WholeEvent;
        engine.recompute(key(scope)).await.unwrap();
        for field in ["q1", "q2", "q3"] {
            db.set_raw_value(field, -1, "done").await;
        }

        let progress = engine.recompute(key(scope)).await.unwrap();

        assert_eq!(progress, Some(Percentage::new(43)));
        let record = engine.progress_for(&key(scope)).await.unwrap().unwrap();
        assert_eq!(record.progress, Percentage::new(43));
        assert!(record.updated_at.is_some());
    }

    #[tokio::test]
    async fn nothing_required_is_complete() {
        let db = TestDb::new().await;
        db.document(1, "Feedback").await;
        db.event(1, None).await;
        db.question(1, "comments", "textarea", 1, false).await;
        db.question(1, "rating", "radio", 2, false).await;
        let registry = ProgressRegistry::new();

        let progress = engine(&db, &registry).recompute(key(TraineeScope::WholeEvent)).await.unwrap();

        assert_eq!(progress, Some(Percentage::HUNDRED));
    }

    #[tokio::test]
    async fn completed_flag_counts_even_with_empty_value() {
        let db = TestDb::new().await;
        seven_required(&db).await;
        let registry = ProgressRegistry::new();
        let engine = engine(&db, &registry);
        engine.recompute(key(TraineeScope::WholeEvent)).await.unwrap();
        db.exec("UPDATE responses SET completed = 1").await;

        let progress = engine.recompute(key(TraineeScope::WholeEvent)).await.unwrap();

        assert_eq!(progress, Some(Percentage::HUNDRED));
    }

    #[tokio::test]
    async fn repeated_recompute_updates_a_single_row_per_scope() {
        let db = TestDb::new().await;
        seven_required(&db).await;
        let registry = ProgressRegistry::new();
        let engine = engine(&db, &registry);

        for _ in 0..3 {
            engine.recompute(key(TraineeScope::WholeEvent)).await.unwrap();
            engine.recompute(key(TraineeScope::Trainee(TraineeId::new(4)))).await.unwrap();
        }

        assert_eq!(db.count("SELECT COUNT(*) AS n FROM document_progress", &[]).await, 2);
        assert_eq!(
            db.count("SELECT COUNT(*) AS n FROM document_progress WHERE trainee_id IS NULL", &[]).await,
            1
        );
        assert_eq!(engine.progress_for_event(EVENT).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_recomputes_keep_one_row_per_key() {
        let db = TestDb::new().await;
        seven_required(&db).await;
        let registry = ProgressRegistry::new();
        let engine = engine(&db, &registry);
        let whole_event = key(TraineeScope::WholeEvent);
        let trainee = key(TraineeScope::Trainee(TraineeId::new(4)));

        let (a, b) = tokio::join!(engine.recompute(whole_event), engine.recompute(whole_event));
        let (c, d) = tokio::join!(engine.recompute(trainee), engine.recompute(trainee));

        for outcome in [a, b, c, d] {
            assert_eq!(outcome.unwrap(), Some(Percentage::ZERO));
        }
        assert_eq!(
            db.count("SELECT COUNT(*) AS n FROM document_progress WHERE trainee_id IS NULL", &[]).await,
            1
        );
        assert_eq!(
            db.count("SELECT COUNT(*) AS n FROM document_progress WHERE trainee_id = 4", &[]).await,
            1
        );
    }

    #[tokio::test]
    async fn missing_event_or_document_is_a_silent_no_op() {
        let db = TestDb::new().await;
        db.document(1, "Checklist").await;
        let registry = ProgressRegistry::new();
        let engine = engine(&db, &registry);

        assert_eq!(engine.recompute(key(TraineeScope::WholeEvent)).await.unwrap(), None);

        db.event(2, None).await;
        let orphan = ProgressKey::new(EventId::new(2), DocumentId::new(9), TraineeScope::WholeEvent);
        assert_eq!(engine.recompute(orphan).await.unwrap(), None);
        assert_eq!(db.count("SELECT COUNT(*) AS n FROM document_progress", &[]).await, 0);
    }

    #[tokio::test]
    async fn only_observers_of_the_exact_key_are_notified() {
        let db = TestDb::new().await;
        seven_required(&db).await;
        let registry = ProgressRegistry::new();
        let engine = engine(&db, &registry);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let other = Arc::new(Mutex::new(Vec::new()));
        let _a = {
            let seen = Arc::clone(&seen);
            registry.subscribe(key(TraineeScope::WholeEvent), move |p| seen.lock().unwrap().push(p))
        };
        let _b = {
            let other = Arc::clone(&other);
            registry.subscribe(key(TraineeScope::Trainee(TraineeId::new(1))), move |p| {
                other.lock().unwrap().push(p)
            })
        };

        engine.recompute(key(TraineeScope::WholeEvent)).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![Percentage::ZERO]);
        assert!(other.lock().unwrap().is_empty());
    }
}
