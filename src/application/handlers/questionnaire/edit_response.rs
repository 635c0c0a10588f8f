//! ResponseEditor - Command handler for editing responses.
//!
//! Value and comment edits are staged on the field write coordinator and
//! land once the field has been quiet for the debounce window; the last
//! edit wins. The completed flag and comment-log appends are written
//! immediately. Every write that lands requests a progress recompute.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::application::handlers::progress::RecomputeScheduler;
use crate::application::write_coordinator::{FlushGuard, WriteCoordinator};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::questionnaire::{
    Catalog, CommentEntry, InputType, Question, ResponseKey, ResponseValue,
};
use crate::ports::{ResponseStore, SqlValue, Statement};

use super::{CatalogResolver, ResponseMaterializer};

/// Default quiescence window for field edits.
pub const DEFAULT_FIELD_DELAY: Duration = Duration::from_millis(500);

const UPSERT_VALUE_SQL: &str = r#"
    INSERT INTO responses (event_id, document_id, field_name, trainee_id, value)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT (event_id, document_id, field_name, trainee_id)
    DO UPDATE SET value = excluded.value
"#;

const UPSERT_COMMENTS_SQL: &str = r#"
    INSERT INTO responses (event_id, document_id, field_name, trainee_id, comments)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT (event_id, document_id, field_name, trainee_id)
    DO UPDATE SET comments = excluded.comments
"#;

const UPSERT_COMPLETED_SQL: &str = r#"
    INSERT INTO responses (event_id, document_id, field_name, trainee_id, completed)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT (event_id, document_id, field_name, trainee_id)
    DO UPDATE SET completed = excluded.completed
"#;

/// Column of a response row touched by a debounced edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditedColumn {
    Value,
    Comments,
}

/// Debounce key: one pending edit per field and column.
pub type EditKey = (ResponseKey, EditedColumn);

/// Command to stage a new value for a field.
#[derive(Debug, Clone)]
pub struct StageValueCommand {
    pub key: ResponseKey,
    pub value: ResponseValue,
    /// Role of the editing user; `None` skips the role check.
    pub role: Option<String>,
}

/// Command to stage new free-text comments for a field.
#[derive(Debug, Clone)]
pub struct StageCommentsCommand {
    pub key: ResponseKey,
    pub comments: String,
    pub role: Option<String>,
}

/// Command to set a field's completed flag.
#[derive(Debug, Clone)]
pub struct SetCompletedCommand {
    pub key: ResponseKey,
    pub completed: bool,
    pub role: Option<String>,
}

/// Command to append an entry to a dynamic comment log.
#[derive(Debug, Clone)]
pub struct AppendCommentCommand {
    pub key: ResponseKey,
    pub author: String,
    pub text: String,
    pub role: Option<String>,
}

/// Statement writing `value` to the row at `key`, creating the row if needed.
pub(crate) fn write_value_statement(key: &ResponseKey, value: &ResponseValue) -> Statement {
    Statement::new(UPSERT_VALUE_SQL, with_key(key, value.encode().into()))
}

fn with_key(key: &ResponseKey, column: SqlValue) -> Vec<SqlValue> {
    vec![
        key.event_id.as_i64().into(),
        key.document_id.as_i64().into(),
        key.field_name.as_str().into(),
        key.scope.response_column().into(),
        column,
    ]
}

/// Looks up the question behind `key` and checks `role` may edit it.
pub(crate) fn editable_question<'a>(
    catalog: &'a Catalog,
    key: &ResponseKey,
    role: Option<&str>,
) -> Result<&'a Question, DomainError> {
    let question = catalog.get(&key.field_name).ok_or_else(|| {
        DomainError::new(
            ErrorCode::QuestionNotFound,
            format!(
                "Document {} has no question '{}'",
                key.document_id, key.field_name
            ),
        )
        .with_detail("field", key.field_name.as_str())
    })?;

    if let Some(role) = role {
        if !question.editable_by(role) {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                format!("Role '{}' may not edit '{}'", role, question.field_name),
            )
            .with_detail("field", question.field_name.as_str())
            .with_detail("role", role));
        }
    }

    Ok(question)
}

/// Handler for response edits.
#[derive(Clone)]
pub struct ResponseEditor {
    store: Arc<dyn ResponseStore>,
    catalogs: CatalogResolver,
    materializer: ResponseMaterializer,
    writes: WriteCoordinator<EditKey>,
    recompute: RecomputeScheduler,
}

impl ResponseEditor {
    pub fn new(store: Arc<dyn ResponseStore>, recompute: RecomputeScheduler, delay: Duration) -> Self {
        Self {
            catalogs: CatalogResolver::new(Arc::clone(&store)),
            materializer: ResponseMaterializer::new(Arc::clone(&store)),
            store,
            writes: WriteCoordinator::new("field", delay),
            recompute,
        }
    }

    /// Validates and stages a value; it lands after the debounce window.
    pub async fn stage_value(&self, cmd: StageValueCommand) -> Result<(), DomainError> {
        let catalog = self.catalogs.resolve(cmd.key.document_id).await?;
        let question = editable_question(&catalog, &cmd.key, cmd.role.as_deref())?;

        if !cmd.value.matches(question) {
            return Err(DomainError::validation(
                question.field_name.as_str(),
                format!(
                    "Value does not fit a '{}' question",
                    question.input_type.as_str()
                ),
            ));
        }
        if let ResponseValue::TimePair(pair) = &cmd.value {
            pair.validate()?;
        }

        let statement = write_value_statement(&cmd.key, &cmd.value);
        self.stage_write((cmd.key, EditedColumn::Value), statement);
        Ok(())
    }

    /// Stages the free-text comments of a field.
    pub async fn stage_comments(&self, cmd: StageCommentsCommand) -> Result<(), DomainError> {
        let catalog = self.catalogs.resolve(cmd.key.document_id).await?;
        editable_question(&catalog, &cmd.key, cmd.role.as_deref())?;

        let statement = Statement::new(UPSERT_COMMENTS_SQL, with_key(&cmd.key, cmd.comments.into()));
        self.stage_write((cmd.key, EditedColumn::Comments), statement);
        Ok(())
    }

    /// Writes the completed flag now; store failures reach the caller.
    pub async fn set_completed(&self, cmd: SetCompletedCommand) -> Result<(), DomainError> {
        let catalog = self.catalogs.resolve(cmd.key.document_id).await?;
        editable_question(&catalog, &cmd.key, cmd.role.as_deref())?;

        let params = with_key(&cmd.key, cmd.completed.into());
        self.store.run(UPSERT_COMPLETED_SQL, &params).await?;
        debug!(field = %cmd.key.field_name, completed = cmd.completed, "Completed flag written");

        self.recompute.request(cmd.key.progress_key());
        Ok(())
    }

    /// Appends to a dynamic comment log and writes it now.
    ///
    /// A value edit still pending for the field is flushed first so the
    /// append builds on it.
    pub async fn append_comment(&self, cmd: AppendCommentCommand) -> Result<Vec<CommentEntry>, DomainError> {
        let catalog = self.catalogs.resolve(cmd.key.document_id).await?;
        let question = editable_question(&catalog, &cmd.key, cmd.role.as_deref())?;
        if question.input_type != InputType::DynamicComments {
            return Err(DomainError::validation(
                question.field_name.as_str(),
                "Comments can only be appended to a comment log",
            ));
        }

        let entry = CommentEntry::new(cmd.author, cmd.text)?;

        let edit_key = (cmd.key, EditedColumn::Value);
        self.writes.flush(&edit_key).await?;
        let (key, _) = edit_key;

        let mut entries = match self.materializer.load_one(&key, question).await? {
            Some(response) => match response.value {
                ResponseValue::Comments(entries) => entries,
                _ => Vec::new(),
            },
            None => Vec::new(),
        };
        entries.push(entry);

        let statement = write_value_statement(&key, &ResponseValue::Comments(entries.clone()));
        self.store.run(&statement.sql, &statement.params).await?;
        debug!(field = %key.field_name, entries = entries.len(), "Comment appended");

        self.recompute.request(key.progress_key());
        Ok(entries)
    }

    /// Lands every pending edit of `key` now.
    pub async fn flush(&self, key: &ResponseKey) -> Result<(), DomainError> {
        self.writes.flush(&(key.clone(), EditedColumn::Value)).await?;
        self.writes.flush(&(key.clone(), EditedColumn::Comments)).await?;
        Ok(())
    }

    /// Lands every pending edit, then runs every pending recompute.
    pub async fn flush_all(&self) -> usize {
        let fired = self.writes.flush_all().await;
        self.recompute.flush_all().await;
        fired
    }

    pub fn is_pending(&self, key: &ResponseKey) -> bool {
        self.writes.is_pending(&(key.clone(), EditedColumn::Value))
            || self.writes.is_pending(&(key.clone(), EditedColumn::Comments))
    }

    /// Guard that flushes pending field edits when dropped.
    pub fn flush_guard(&self) -> FlushGuard<EditKey> {
        self.writes.flush_guard()
    }

    pub fn coordinator(&self) -> &WriteCoordinator<EditKey> {
        &self.writes
    }

    fn stage_write(&self, edit_key: EditKey, statement: Statement) {
        let store = Arc::clone(&self.store);
        let recompute = self.recompute.clone();
        let progress_key = edit_key.0.progress_key();

        self.writes.stage(edit_key, move || async move {
            store.run(&statement.sql, &statement.params).await?;
            recompute.request(progress_key);
            Ok::<(), DomainError>(())
        });
    }
}
