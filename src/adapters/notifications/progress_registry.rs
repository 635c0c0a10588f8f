//! Progress observer registry.
//!
//! Open views subscribe to the exact document instance they display. A
//! recompute publishes to that key only; everything else is untouched.
//!
//! # Architecture
//!
//! ```text
//! event 4 / document 2 / trainee 9     event 4 / document 2 / whole event
//! ├── checklist panel                  └── register header
//! └── sidebar badge
//! ```
//!
//! Subscriptions are handles: dropping one unsubscribes it, so a view
//! that goes away cannot leak its callback.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::foundation::Percentage;
use crate::domain::questionnaire::ProgressKey;
use crate::ports::ProgressNotifier;

type Callback = Arc<dyn Fn(Percentage) + Send + Sync>;

type Observers = HashMap<ProgressKey, HashMap<Uuid, Callback>>;

#[derive(Default)]
struct Inner {
    observers: RwLock<Observers>,
}

impl Inner {
    fn remove(&self, key: &ProgressKey, id: &Uuid) {
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(callbacks) = observers.get_mut(key) {
            callbacks.remove(id);
            if callbacks.is_empty() {
                observers.remove(key);
            }
        }
    }
}

/// Registry of progress observers keyed by document instance.
///
/// Cheap to clone; clones share the same observers.
#[derive(Clone, Default)]
pub struct ProgressRegistry {
    inner: Arc<Inner>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for `key` until the returned handle is dropped.
    pub fn subscribe<F>(&self, key: ProgressKey, callback: F) -> ProgressSubscription
    where
        F: Fn(Percentage) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.inner
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_default()
            .insert(id, Arc::new(callback));

        ProgressSubscription {
            key,
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Subscribes with a channel instead of a callback, for async views.
    pub fn subscribe_channel(
        &self,
        key: ProgressKey,
    ) -> (ProgressSubscription, mpsc::UnboundedReceiver<Percentage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe(key, move |progress| {
            // Receiver gone means the view is closing; nothing to do
            let _ = tx.send(progress);
        });
        (subscription, rx)
    }

    /// Number of live observers for `key`.
    pub fn observer_count(&self, key: &ProgressKey) -> usize {
        self.inner
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    /// Keys with at least one observer (for monitoring/debugging).
    pub fn active_keys(&self) -> Vec<ProgressKey> {
        self.inner
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }
}

impl ProgressNotifier for ProgressRegistry {
    fn publish(&self, key: &ProgressKey, progress: Percentage) {
        // Callbacks run outside the lock so they may subscribe or drop handles.
        let callbacks: Vec<Callback> = self
            .inner
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|callbacks| callbacks.values().cloned().collect())
            .unwrap_or_default();

        for callback in callbacks {
            callback(progress);
        }
    }
}

/// Live registration of one observer; unsubscribes when dropped.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct ProgressSubscription {
    key: ProgressKey,
    id: Uuid,
    registry: Weak<Inner>,
}

impl ProgressSubscription {
    pub fn key(&self) -> &ProgressKey {
        &self.key
    }

    /// Unsubscribes now; same as dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for ProgressSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.remove(&self.key, &self.id);
        }
    }
}

impl std::fmt::Debug for ProgressSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSubscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DocumentId, EventId, TraineeId, TraineeScope};
    use std::sync::Mutex;

    fn key(trainee: Option<i64>) -> ProgressKey {
        let scope = trainee
            .map(|id| TraineeScope::Trainee(TraineeId::new(id)))
            .unwrap_or(TraineeScope::WholeEvent);
        ProgressKey::new(EventId::new(4), DocumentId::new(2), scope)
    }

    fn recorder() -> (Arc<Mutex<Vec<u8>>>, impl Fn(Percentage) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |p: Percentage| sink.lock().unwrap().push(p.value()))
    }

    #[test]
    fn publish_reaches_only_the_exact_key() {
        let registry = ProgressRegistry::new();
        let (trainee_seen, trainee_cb) = recorder();
        let (event_seen, event_cb) = recorder();
        let _a = registry.subscribe(key(Some(9)), trainee_cb);
        let _b = registry.subscribe(key(None), event_cb);

        registry.publish(&key(Some(9)), Percentage::new(40));

        assert_eq!(*trainee_seen.lock().unwrap(), vec![40]);
        assert!(event_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn keys_that_would_collide_as_strings_stay_distinct() {
        // "1" + "12" and "11" + "2" concatenate to the same text
        let registry = ProgressRegistry::new();
        let a = ProgressKey::new(EventId::new(1), DocumentId::new(12), TraineeScope::WholeEvent);
        let b = ProgressKey::new(EventId::new(11), DocumentId::new(2), TraineeScope::WholeEvent);
        let (seen, cb) = recorder();
        let _sub = registry.subscribe(a, cb);

        registry.publish(&b, Percentage::HUNDRED);

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn dropping_the_handle_unsubscribes() {
        let registry = ProgressRegistry::new();
        let (seen, cb) = recorder();
        let sub = registry.subscribe(key(Some(1)), cb);
        assert_eq!(registry.observer_count(&key(Some(1))), 1);

        drop(sub);
        registry.publish(&key(Some(1)), Percentage::new(10));

        assert_eq!(registry.observer_count(&key(Some(1))), 0);
        assert!(registry.active_keys().is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn every_observer_of_a_key_is_notified() {
        let registry = ProgressRegistry::new();
        let (first, cb1) = recorder();
        let (second, cb2) = recorder();
        let _a = registry.subscribe(key(None), cb1);
        let _b = registry.subscribe(key(None), cb2);

        registry.publish(&key(None), Percentage::new(75));

        assert_eq!(*first.lock().unwrap(), vec![75]);
        assert_eq!(*second.lock().unwrap(), vec![75]);
    }

    #[test]
    fn publish_without_observers_is_a_no_op() {
        let registry = ProgressRegistry::new();
        registry.publish(&key(None), Percentage::ZERO);
        assert!(registry.active_keys().is_empty());
    }

    #[test]
    fn handle_outliving_registry_drops_cleanly() {
        let registry = ProgressRegistry::new();
        let sub = registry.subscribe(key(None), |_| {});
        drop(registry);
        drop(sub);
    }

    #[tokio::test]
    async fn channel_subscription_receives_updates() {
        let registry = ProgressRegistry::new();
        let (_sub, mut rx) = registry.subscribe_channel(key(Some(3)));

        registry.publish(&key(Some(3)), Percentage::new(43));

        assert_eq!(rx.recv().await, Some(Percentage::new(43)));
    }
}
