//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Edits are staged through a [`WriteCoordinator`] so rapid typing becomes a
//! single write, and every persisted change schedules a progress recompute.

pub mod handlers;
pub mod write_coordinator;

pub use handlers::{
    // Progress
    CompletionEngine, ProgressReconciler, ReconcileSummary, RecomputeScheduler,
    DEFAULT_RECOMPUTE_DELAY,
    // Questionnaire
    AppendCommentCommand, CatalogResolver, GridEditCommand, GridEditService, ReportError,
    ReportGenerator, ResponseEditor, ResponseMaterializer, SetCompletedCommand,
    StageCommentsCommand, StageValueCommand, DEFAULT_FIELD_DELAY,
};
pub use write_coordinator::{FlushGuard, WriteCoordinator};
