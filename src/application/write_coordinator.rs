//! Debounced write coordinator.
//!
//! Holds at most one pending writer per key. Staging a new writer for a
//! key replaces the previous one and restarts that key's quiescence timer;
//! when the timer runs out the last writer fires. Writes for one key go
//! through a per-key lane, so they never overlap and land in staging order.
//!
//! # Lifecycle
//!
//! ```text
//! stage(k, w1) ──► timer(k) ─┐
//! stage(k, w2) ──► timer(k) ─┼─ restarted, w1 discarded
//!                            └─► quiet for `delay` ──► lane(k) ──► w2()
//! flush(k)     ──────────────────────────────────────► lane(k) ──► pending()
//! ```
//!
//! Writers that fire from a timer have nobody to report to: failures are
//! logged and dropped. `flush` returns the failure to its caller.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::domain::foundation::DomainError;

type Writer = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), DomainError>> + Send>;

type Lane = Arc<tokio::sync::Mutex<()>>;

struct Pending {
    writer: Writer,
    timer: JoinHandle<()>,
    generation: u64,
}

struct Shared<K> {
    name: &'static str,
    delay: Duration,
    pending: Mutex<HashMap<K, Pending>>,
    lanes: Mutex<HashMap<K, Lane>>,
    next_generation: AtomicU64,
}

impl<K> Shared<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    fn pending(&self) -> MutexGuard<'_, HashMap<K, Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lanes(&self) -> MutexGuard<'_, HashMap<K, Lane>> {
        self.lanes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lane(&self, key: &K) -> Lane {
        Arc::clone(self.lanes().entry(key.clone()).or_default())
    }

    fn release_lane(&self, key: &K, lane: Lane) {
        let mut lanes = self.lanes();
        // Only the map and this caller hold it: nobody is queued behind us.
        if Arc::strong_count(&lane) == 2 {
            lanes.remove(key);
        }
    }

    /// Runs `writer` on the key's lane.
    async fn execute(&self, key: &K, writer: Writer) -> Result<(), DomainError> {
        let lane = self.lane(key);
        let result = {
            let _turn = lane.lock().await;
            writer().await
        };
        self.release_lane(key, lane);
        result
    }

    /// Runs the pending writer for `key` if it is still `generation`.
    ///
    /// The lane is held before the writer leaves the table, so a `flush`
    /// that finds nothing pending still waits for this write to land.
    async fn fire_if_current(&self, key: &K, generation: u64) -> Option<Result<(), DomainError>> {
        let lane = self.lane(key);
        let result = {
            let _turn = lane.lock().await;
            let writer = {
                let mut pending = self.pending();
                let still_current = pending.get(key).map(|entry| entry.generation) == Some(generation);
                if still_current {
                    pending.remove(key).map(|entry| entry.writer)
                } else {
                    None
                }
            };
            match writer {
                Some(writer) => {
                    debug!(coordinator = self.name, key = ?key, "Quiescence reached, writing");
                    Some(writer().await)
                }
                None => None,
            }
        };
        self.release_lane(key, lane);
        result
    }

    /// Waits until any write already running for `key` has finished.
    async fn settle(&self, key: &K) {
        let lane = self.lane(key);
        drop(lane.lock().await);
        self.release_lane(key, lane);
    }

    fn take(&self, key: &K) -> Option<Writer> {
        self.pending().remove(key).map(|pending| {
            pending.timer.abort();
            pending.writer
        })
    }

    fn take_all(&self) -> Vec<(K, Writer)> {
        self.pending()
            .drain()
            .map(|(key, pending)| {
                pending.timer.abort();
                (key, pending.writer)
            })
            .collect()
    }
}

/// Per-key debounced writer queue.
///
/// Cheap to clone; clones share pending writers and timers. Must be used
/// from within a tokio runtime.
pub struct WriteCoordinator<K> {
    shared: Arc<Shared<K>>,
}

impl<K> Clone for WriteCoordinator<K> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K> WriteCoordinator<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    /// Creates a coordinator; `name` labels its log lines.
    pub fn new(name: &'static str, delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                name,
                delay,
                pending: Mutex::new(HashMap::new()),
                lanes: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn delay(&self) -> Duration {
        self.shared.delay
    }

    /// Stages `write` for `key`, replacing any writer already pending there.
    pub fn stage<F, Fut>(&self, key: K, write: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), DomainError>> + Send + 'static,
    {
        let writer: Writer = Box::new(move || write().boxed());
        let generation = self.shared.next_generation.fetch_add(1, Ordering::Relaxed);

        // The timer cannot look at the table before its own entry is in it.
        let mut pending = self.shared.pending();

        let shared = Arc::clone(&self.shared);
        let timer_key = key.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(shared.delay).await;

            if let Some(Err(e)) = shared.fire_if_current(&timer_key, generation).await {
                error!(
                    coordinator = shared.name,
                    key = ?timer_key,
                    error = %e,
                    "Background write failed, dropping it"
                );
            }
        });

        if let Some(previous) = pending.insert(
            key.clone(),
            Pending {
                writer,
                timer,
                generation,
            },
        ) {
            previous.timer.abort();
            debug!(coordinator = self.shared.name, key = ?key, "Superseded pending write");
        } else {
            debug!(coordinator = self.shared.name, key = ?key, "Staged write");
        }
    }

    /// Fires the pending writer for `key` now, if any, and waits for it.
    ///
    /// Also waits for a write for `key` that a timer already started, so on
    /// return everything staged for `key` has landed. Returns whether a
    /// pending writer was fired.
    pub async fn flush(&self, key: &K) -> Result<bool, DomainError> {
        match self.shared.take(key) {
            Some(writer) => {
                debug!(coordinator = self.shared.name, key = ?key, "Flushing pending write");
                self.shared.execute(key, writer).await?;
                Ok(true)
            }
            None => {
                self.shared.settle(key).await;
                Ok(false)
            }
        }
    }

    /// Fires every pending writer now and waits for all writes in flight.
    ///
    /// Failures are logged; returns the number of writers fired.
    pub async fn flush_all(&self) -> usize {
        let writers = self.shared.take_all();
        let fired = writers.len();

        let runs = writers.into_iter().map(|(key, writer)| {
            let shared = Arc::clone(&self.shared);
            async move {
                if let Err(e) = shared.execute(&key, writer).await {
                    error!(
                        coordinator = shared.name,
                        key = ?key,
                        error = %e,
                        "Flushed write failed, dropping it"
                    );
                }
            }
        });
        futures::future::join_all(runs).await;

        let in_flight: Vec<K> = self.shared.lanes().keys().cloned().collect();
        for key in in_flight {
            self.shared.settle(&key).await;
        }

        if fired > 0 {
            debug!(coordinator = self.shared.name, fired, "Flushed all pending writes");
        }
        fired
    }

    /// Drops the pending writer for `key` without running it.
    pub fn cancel(&self, key: &K) -> bool {
        self.shared.take(key).is_some()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.shared.pending().contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        self.shared.pending().len()
    }

    /// Returns a guard that flushes everything still pending when dropped.
    pub fn flush_guard(&self) -> FlushGuard<K> {
        FlushGuard {
            coordinator: Some(self.clone()),
        }
    }

    /// Waits for the shutdown signal, then flushes every pending write.
    ///
    /// A closed channel counts as a shutdown signal.
    pub async fn run_until_shutdown(&self, mut shutdown: watch::Receiver<bool>) -> usize {
        loop {
            if *shutdown.borrow() {
                break;
            }
            if shutdown.changed().await.is_err() {
                break;
            }
        }
        debug!(coordinator = self.shared.name, "Shutdown signal received");
        self.flush_all().await
    }
}

/// Flushes a coordinator's pending writes when it goes out of scope.
///
/// Dropping spawns the flush on the current runtime; call
/// [`FlushGuard::finish`] to flush and wait instead.
#[must_use = "dropping the guard flushes immediately"]
pub struct FlushGuard<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    coordinator: Option<WriteCoordinator<K>>,
}

impl<K> FlushGuard<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    /// Flushes now and waits for every write to land.
    pub async fn finish(mut self) -> usize {
        match self.coordinator.take() {
            Some(coordinator) => coordinator.flush_all().await,
            None => 0,
        }
    }
}

impl<K> Drop for FlushGuard<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let Some(coordinator) = self.coordinator.take() else {
            return;
        };
        if coordinator.pending_count() == 0 {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    coordinator.flush_all().await;
                });
            }
            Err(_) => warn!(
                coordinator = coordinator.shared.name,
                pending = coordinator.pending_count(),
                "No runtime available, pending writes dropped"
            ),
        }
    }
}
