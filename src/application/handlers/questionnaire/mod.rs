//! Questionnaire handlers - catalog resolution, response loading and editing.
//!
//! - `CatalogResolver` - question definitions of one document
//! - `ResponseMaterializer` - load-or-initialize a document instance's responses
//! - `ResponseEditor` - debounced value/comment writes and immediate flag writes
//! - `GridEditService` - per-trainee grid edits with the signature cascade
//! - `ReportGenerator` - sectioned document reports handed to a renderer

mod apply_grid_edit;
mod edit_response;
mod generate_report;
mod load_responses;
mod resolve_catalog;

pub use apply_grid_edit::{GridEditCommand, GridEditService};
pub use edit_response::{
    AppendCommentCommand, EditKey, EditedColumn, ResponseEditor, SetCompletedCommand,
    StageCommentsCommand, StageValueCommand, DEFAULT_FIELD_DELAY,
};
pub use generate_report::{ReportError, ReportGenerator};
pub use load_responses::ResponseMaterializer;
pub use resolve_catalog::CatalogResolver;
