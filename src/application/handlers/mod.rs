//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod progress;
pub mod questionnaire;

#[cfg(test)]
pub(crate) mod test_support;

pub use progress::{
    CompletionEngine, ProgressReconciler, ReconcileSummary, RecomputeScheduler,
    DEFAULT_RECOMPUTE_DELAY,
};
pub use questionnaire::{
    AppendCommentCommand, CatalogResolver, GridEditCommand, GridEditService, ReportError,
    ReportGenerator, ResponseEditor, ResponseMaterializer, SetCompletedCommand,
    StageCommentsCommand, StageValueCommand, DEFAULT_FIELD_DELAY,
};
