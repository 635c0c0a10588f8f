//! Progress records - stored completion of a document instance.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{DocumentId, EventId, Percentage, Timestamp, TraineeScope};

/// Identity of a document instance: (event, document, trainee scope).
///
/// Keys both the progress table and progress subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProgressKey {
    pub event_id: EventId,
    pub document_id: DocumentId,
    pub scope: TraineeScope,
}

impl ProgressKey {
    pub fn new(event_id: EventId, document_id: DocumentId, scope: TraineeScope) -> Self {
        Self {
            event_id,
            document_id,
            scope,
        }
    }
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event {} / document {} / {}",
            self.event_id, self.document_id, self.scope
        )
    }
}

/// Stored completion for one document instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub key: ProgressKey,
    pub progress: Percentage,
    pub updated_at: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TraineeId;

    #[test]
    fn keys_differ_by_scope() {
        let course = ProgressKey::new(EventId::new(1), DocumentId::new(1), TraineeScope::WholeEvent);
        let trainee = ProgressKey::new(
            EventId::new(1),
            DocumentId::new(1),
            TraineeScope::Trainee(TraineeId::new(1)),
        );
        assert_ne!(course, trainee);
    }

    #[test]
    fn display_names_all_parts() {
        let key = ProgressKey::new(EventId::new(4), DocumentId::new(9), TraineeScope::WholeEvent);
        assert_eq!(key.to_string(), "event 4 / document 9 / whole event");
    }
}
