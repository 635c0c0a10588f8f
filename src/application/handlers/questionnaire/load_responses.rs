//! ResponseMaterializer - Ensures response rows exist and decodes them.
//!
//! A document instance has exactly one row per catalog question. Missing
//! rows are created with `INSERT OR IGNORE`, and the map is always read
//! back from the store afterwards, so two views initializing the same
//! instance at once end up with identical maps and no duplicate rows.
//! An instance whose event no longer exists loads as an empty map.

use std::sync::Arc;

use tracing::warn;

use crate::domain::foundation::{DocumentId, DomainError, EventId, TraineeScope};
use crate::domain::questionnaire::{Catalog, Question, Response, ResponseKey, ResponseMap, ResponseValue};
use crate::ports::{ResponseStore, Row, Statement};

const INITIALIZE_SQL: &str = r#"
    INSERT OR IGNORE INTO responses
        (event_id, document_id, field_name, trainee_id, value, completed, comments)
    VALUES (?, ?, ?, ?, ?, 0, '')
"#;

const EVENT_EXISTS_SQL: &str = "SELECT id FROM events WHERE id = ?";

const LOAD_SQL: &str = r#"
    SELECT field_name, value, completed, comments
    FROM responses
    WHERE event_id = ? AND document_id = ? AND trainee_id = ?
"#;

const LOAD_ONE_SQL: &str = r#"
    SELECT field_name, value, completed, comments
    FROM responses
    WHERE event_id = ? AND document_id = ? AND field_name = ? AND trainee_id = ?
"#;

/// Loads (creating where missing) the responses of a document instance.
#[derive(Clone)]
pub struct ResponseMaterializer {
    store: Arc<dyn ResponseStore>,
}

impl ResponseMaterializer {
    pub fn new(store: Arc<dyn ResponseStore>) -> Self {
        Self { store }
    }

    /// Returns field name → response for every catalog question.
    ///
    /// Idempotent: with no writes in between, repeated calls return equal
    /// maps and create nothing new.
    pub async fn load_or_initialize(
        &self,
        event_id: EventId,
        document_id: DocumentId,
        scope: TraineeScope,
        catalog: &Catalog,
    ) -> Result<ResponseMap, DomainError> {
        if catalog.is_empty() {
            return Ok(ResponseMap::new());
        }
        if !self.event_exists(event_id).await? {
            warn!(
                event = %event_id,
                document = %document_id,
                "Event not found, responses not initialized"
            );
            return Ok(ResponseMap::new());
        }

        let inserts = catalog
            .questions()
            .iter()
            .map(|question| {
                Statement::new(
                    INITIALIZE_SQL,
                    vec![
                        event_id.as_i64().into(),
                        document_id.as_i64().into(),
                        question.field_name.clone().into(),
                        scope.response_column().into(),
                        ResponseValue::initial_for(question).encode().into(),
                    ],
                )
            })
            .collect();
        self.store.transaction(inserts).await?;

        let rows = self
            .store
            .query(
                LOAD_SQL,
                &[
                    event_id.as_i64().into(),
                    document_id.as_i64().into(),
                    scope.response_column().into(),
                ],
            )
            .await?;

        let mut responses = ResponseMap::new();
        for row in &rows {
            let field_name = row.text("field_name")?;
            // Rows for questions no longer in the catalog are kept but not shown
            if let Some(question) = catalog.get(&field_name) {
                responses.insert(field_name, decode_row(question, row)?);
            }
        }
        Ok(responses)
    }

    pub async fn event_exists(&self, event_id: EventId) -> Result<bool, DomainError> {
        Ok(self
            .store
            .get(EVENT_EXISTS_SQL, &[event_id.as_i64().into()])
            .await?
            .is_some())
    }

    /// Reads one response without creating it.
    pub async fn load_one(
        &self,
        key: &ResponseKey,
        question: &Question,
    ) -> Result<Option<Response>, DomainError> {
        self.store
            .get(
                LOAD_ONE_SQL,
                &[
                    key.event_id.as_i64().into(),
                    key.document_id.as_i64().into(),
                    key.field_name.as_str().into(),
                    key.scope.response_column().into(),
                ],
            )
            .await?
            .map(|row| decode_row(question, &row))
            .transpose()
    }
}

/// Decodes a stored row; unreadable values become the empty shape.
pub(crate) fn decode_row(question: &Question, row: &Row) -> Result<Response, DomainError> {
    let raw = row.text("value")?;
    let value = ResponseValue::decode(question, &raw).unwrap_or_else(|e| {
        warn!(
            field = %question.field_name,
            input_type = %question.input_type.as_str(),
            error = %e,
            "Malformed stored value, using empty value"
        );
        ResponseValue::empty_for(question)
    });

    Ok(Response {
        value,
        completed: row.bool("completed")?,
        comments: row.text("comments")?,
    })
}
