//! RecomputeScheduler - Debounced recompute requests.
//!
//! Every successful response write asks for a recompute of its document
//! instance. Requests for the same instance inside the quiescence window
//! collapse into one run of the completion engine.

use std::sync::Arc;
use std::time::Duration;

use crate::application::write_coordinator::{FlushGuard, WriteCoordinator};
use crate::domain::foundation::DomainError;
use crate::domain::questionnaire::ProgressKey;

use super::CompletionEngine;

/// Default quiescence window for recompute requests.
pub const DEFAULT_RECOMPUTE_DELAY: Duration = Duration::from_millis(250);

/// Coalesces recompute requests per document instance.
#[derive(Clone)]
pub struct RecomputeScheduler {
    engine: Arc<CompletionEngine>,
    requests: WriteCoordinator<ProgressKey>,
}

impl RecomputeScheduler {
    pub fn new(engine: Arc<CompletionEngine>, delay: Duration) -> Self {
        Self {
            engine,
            requests: WriteCoordinator::new("recompute", delay),
        }
    }

    pub fn engine(&self) -> &Arc<CompletionEngine> {
        &self.engine
    }

    /// Requests a recompute of `key`; runs once the key has been quiet.
    pub fn request(&self, key: ProgressKey) {
        let engine = Arc::clone(&self.engine);
        self.requests.stage(key, move || async move {
            engine.recompute(key).await.map(|_| ())
        });
    }

    /// Runs a pending request for `key` now.
    pub async fn flush(&self, key: &ProgressKey) -> Result<bool, DomainError> {
        self.requests.flush(key).await
    }

    /// Runs every pending request now.
    pub async fn flush_all(&self) -> usize {
        self.requests.flush_all().await
    }

    pub fn is_pending(&self, key: &ProgressKey) -> bool {
        self.requests.is_pending(key)
    }

    pub fn flush_guard(&self) -> FlushGuard<ProgressKey> {
        self.requests.flush_guard()
    }

    pub fn coordinator(&self) -> &WriteCoordinator<ProgressKey> {
        &self.requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notifications::ProgressRegistry;
    use crate::application::handlers::test_support::TestDb;
    use crate::domain::foundation::{DocumentId, EventId, Percentage, TraineeScope};
    use std::sync::Mutex;

    async fn scheduler(db: &TestDb, registry: &ProgressRegistry) -> RecomputeScheduler {
        db.document(1, "Checklist").await;
        db.event(1, None).await;
        db.question(1, "notes", "text", 1, true).await;
        let engine = CompletionEngine::new(db.store(), Arc::new(registry.clone()));
        RecomputeScheduler::new(Arc::new(engine), DEFAULT_RECOMPUTE_DELAY)
    }

    fn key() -> ProgressKey {
        ProgressKey::new(EventId::new(1), DocumentId::new(1), TraineeScope::WholeEvent)
    }

    #[tokio::test]
    async fn burst_of_requests_runs_the_engine_once() {
        let db = TestDb::new().await;
        let registry = ProgressRegistry::new();
        let scheduler = scheduler(&db, &registry).await;
        let runs = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let runs = Arc::clone(&runs);
            registry.subscribe(key(), move |p| runs.lock().unwrap().push(p))
        };

        for _ in 0..5 {
            scheduler.request(key());
        }
        assert!(scheduler.is_pending(&key()));
        assert!(scheduler.flush(&key()).await.unwrap());

        assert_eq!(*runs.lock().unwrap(), vec![Percentage::ZERO]);
        assert!(!scheduler.is_pending(&key()));
    }

    #[tokio::test]
    async fn request_runs_after_the_quiet_period() {
        let db = TestDb::new().await;
        let registry = ProgressRegistry::new();
        let scheduler = scheduler(&db, &registry).await;
        let (_sub, mut rx) = registry.subscribe_channel(key());

        scheduler.request(key());

        let progress = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap();
        assert_eq!(progress, Some(Percentage::ZERO));
    }
}
