//! CatalogResolver - Query handler for a document's question catalog.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::domain::foundation::{DocumentId, DomainError, QuestionId};
use crate::domain::questionnaire::{Catalog, InputType, Question};
use crate::ports::{ResponseStore, Row};

const QUESTIONS_SQL: &str = r#"
    SELECT id, document_id, field_name, input_type, section, required, role,
           allow_multiple, position
    FROM questions
    WHERE document_id = ?
    ORDER BY position, id
"#;

const OPTIONS_SQL: &str = r#"
    SELECT q.field_name, o.value
    FROM question_options o
    JOIN questions q ON q.id = o.question_id
    WHERE q.document_id = ?
    ORDER BY o.question_id, o.position, o.id
"#;

/// Resolves the ordered questions and option lists of a document.
#[derive(Clone)]
pub struct CatalogResolver {
    store: Arc<dyn ResponseStore>,
}

impl CatalogResolver {
    pub fn new(store: Arc<dyn ResponseStore>) -> Self {
        Self { store }
    }

    /// Loads the catalog for `document_id`.
    ///
    /// An unknown document yields an empty catalog rather than an error.
    pub async fn resolve(&self, document_id: DocumentId) -> Result<Catalog, DomainError> {
        let rows = self
            .store
            .query(QUESTIONS_SQL, &[document_id.as_i64().into()])
            .await?;
        let questions = rows
            .iter()
            .map(row_to_question)
            .collect::<Result<Vec<_>, _>>()?;

        let choice_fields: Vec<&str> = questions
            .iter()
            .filter(|q| q.input_type.has_options())
            .map(|q| q.field_name.as_str())
            .collect();

        let mut options: HashMap<String, Vec<String>> = HashMap::new();
        if !choice_fields.is_empty() {
            for row in self
                .store
                .query(OPTIONS_SQL, &[document_id.as_i64().into()])
                .await?
            {
                let field = row.text("field_name")?;
                if choice_fields.contains(&field.as_str()) {
                    options.entry(field).or_default().push(row.text("value")?);
                }
            }
        }

        Ok(Catalog::new(document_id, questions, options))
    }

    pub async fn document_exists(&self, document_id: DocumentId) -> Result<bool, DomainError> {
        Ok(self.document_name(document_id).await?.is_some())
    }

    /// Display name of a document, `None` if it does not exist.
    pub async fn document_name(&self, document_id: DocumentId) -> Result<Option<String>, DomainError> {
        self.store
            .get(
                "SELECT name FROM documents WHERE id = ?",
                &[document_id.as_i64().into()],
            )
            .await?
            .map(|row| row.text("name"))
            .transpose()
    }
}

fn row_to_question(row: &Row) -> Result<Question, DomainError> {
    let field_name = row.text("field_name")?;
    let raw_type = row.text("input_type")?;
    let input_type = raw_type.parse::<InputType>().unwrap_or_else(|_| {
        warn!(field = %field_name, input_type = %raw_type, "Unknown input type, treating as text");
        InputType::Text
    });

    Ok(Question {
        id: QuestionId::new(row.i64("id")?),
        document_id: DocumentId::new(row.i64("document_id")?),
        field_name,
        input_type,
        section: row.text("section")?,
        required: row.bool("required")?,
        role: row.opt_text("role")?.filter(|r| !r.trim().is_empty()),
        allow_multiple: row.bool("allow_multiple")?,
        position: row.i64("position")?,
    })
}
