//! GridEditService - Command handler for per-trainee grid cell edits.
//!
//! Signature grid days cascade absence forward (and take it back) across
//! the document's other signature grid days. Every touched day is written
//! in one transaction, followed by a single recompute request.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::handlers::progress::RecomputeScheduler;
use crate::domain::foundation::{DomainError, ErrorCode, EventId, TraineeId};
use crate::domain::questionnaire::{
    Catalog, GridCell, GridUpdate, InputType, ResponseKey, ResponseMap, ResponseValue,
    SignatureDay, SignatureGrid, TraineeGrid,
};
use crate::ports::ResponseStore;

use super::edit_response::{editable_question, write_value_statement};
use super::{CatalogResolver, ResponseMaterializer};

/// Command to set or clear one trainee's cell in a grid question.
#[derive(Debug, Clone)]
pub struct GridEditCommand {
    /// Response holding the grid (its field is the edited day for signature grids).
    pub key: ResponseKey,
    pub trainee: TraineeId,
    /// New cell; `None` clears it.
    pub cell: Option<GridCell>,
    pub role: Option<String>,
}

/// Handler for grid cell edits.
#[derive(Clone)]
pub struct GridEditService {
    store: Arc<dyn ResponseStore>,
    catalogs: CatalogResolver,
    materializer: ResponseMaterializer,
    recompute: RecomputeScheduler,
}

impl GridEditService {
    pub fn new(store: Arc<dyn ResponseStore>, recompute: RecomputeScheduler) -> Self {
        Self {
            catalogs: CatalogResolver::new(Arc::clone(&store)),
            materializer: ResponseMaterializer::new(Arc::clone(&store)),
            store,
            recompute,
        }
    }

    /// Applies the edit and returns the full new map of every touched field.
    ///
    /// An edit for an event that no longer exists writes nothing and
    /// returns no updates.
    pub async fn apply(&self, cmd: GridEditCommand) -> Result<Vec<GridUpdate>, DomainError> {
        let catalog = self.catalogs.resolve(cmd.key.document_id).await?;
        let question = editable_question(&catalog, &cmd.key, cmd.role.as_deref())?;

        if !question.input_type.is_trainee_grid() {
            return Err(DomainError::new(
                ErrorCode::InvalidGridEdit,
                format!("'{}' is not a grid question", question.field_name),
            )
            .with_detail("field", question.field_name.as_str()));
        }

        if !self.materializer.event_exists(cmd.key.event_id).await? {
            warn!(
                event = %cmd.key.event_id,
                field = %question.field_name,
                "Event not found, grid edit ignored"
            );
            return Ok(Vec::new());
        }

        let responses = self
            .materializer
            .load_or_initialize(cmd.key.event_id, cmd.key.document_id, cmd.key.scope, &catalog)
            .await?;

        let cascades = question.input_type == InputType::SignatureGrid && question.day_ordinal().is_some();
        if question.input_type == InputType::SignatureGrid && !cascades {
            warn!(field = %question.field_name, "Signature grid field has no day number, editing without cascade");
        }

        let updates = if cascades {
            let duration_days = self.duration_days(cmd.key.event_id).await?;
            let mut grid = signature_grid(&catalog, &responses, duration_days);
            grid.apply_edit(&question.field_name, cmd.trainee, cmd.cell)?
        } else {
            let mut cells = grid_cells(&responses, &question.field_name);
            match cmd.cell {
                Some(cell) => cells.insert(cmd.trainee, cell),
                None => cells.remove(&cmd.trainee),
            };
            vec![GridUpdate {
                field_name: question.field_name.clone(),
                cells,
            }]
        };

        let statements = updates
            .iter()
            .map(|update| {
                write_value_statement(
                    &cmd.key.with_field(update.field_name.as_str()),
                    &ResponseValue::Grid(update.cells.clone()),
                )
            })
            .collect();
        self.store.transaction(statements).await?;
        debug!(
            field = %question.field_name,
            trainee = %cmd.trainee,
            touched = updates.len(),
            "Grid edit written"
        );

        self.recompute.request(cmd.key.progress_key());
        Ok(updates)
    }

    async fn duration_days(&self, event_id: EventId) -> Result<Option<u32>, DomainError> {
        let row = self
            .store
            .get(
                "SELECT duration_days FROM events WHERE id = ?",
                &[event_id.as_i64().into()],
            )
            .await?
            .ok_or_else(|| {
                DomainError::new(ErrorCode::EventNotFound, format!("Event {} not found", event_id))
            })?;
        Ok(row
            .opt_i64("duration_days")?
            .and_then(|days| u32::try_from(days).ok())
            .filter(|days| *days > 0))
    }
}

fn grid_cells(responses: &ResponseMap, field_name: &str) -> TraineeGrid {
    responses
        .get(field_name)
        .and_then(|response| response.value.as_grid())
        .cloned()
        .unwrap_or_default()
}

fn signature_grid(catalog: &Catalog, responses: &ResponseMap, duration_days: Option<u32>) -> SignatureGrid {
    let days = catalog
        .signature_grid_days()
        .into_iter()
        .map(|(day, question)| SignatureDay {
            field_name: question.field_name.clone(),
            day,
            cells: grid_cells(responses, &question.field_name),
        })
        .collect();
    SignatureGrid::new(days, duration_days)
}
