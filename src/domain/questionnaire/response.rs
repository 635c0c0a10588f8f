//! Response - the captured answer to one question for one document instance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ProgressKey, ResponseValue};
use crate::domain::foundation::{DocumentId, EventId, TraineeScope};

/// Identity of a response row.
///
/// At most one row exists per key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResponseKey {
    pub event_id: EventId,
    pub document_id: DocumentId,
    pub field_name: String,
    pub scope: TraineeScope,
}

impl ResponseKey {
    pub fn new(
        event_id: EventId,
        document_id: DocumentId,
        field_name: impl Into<String>,
        scope: TraineeScope,
    ) -> Self {
        Self {
            event_id,
            document_id,
            field_name: field_name.into(),
            scope,
        }
    }

    /// Key of the document instance this response belongs to.
    pub fn progress_key(&self) -> ProgressKey {
        ProgressKey::new(self.event_id, self.document_id, self.scope)
    }

    /// Same document instance, different field.
    pub fn with_field(&self, field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            ..self.clone()
        }
    }
}

/// Decoded response state for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub value: ResponseValue,
    pub completed: bool,
    pub comments: String,
}

/// Responses of one document instance keyed by field name.
pub type ResponseMap = BTreeMap<String, Response>;
