//! Progress handlers - computing, scheduling and reconciling completion.

mod reconcile_progress;
mod recompute_progress;
mod schedule_recompute;

pub use reconcile_progress::{ProgressReconciler, ReconcileSummary};
pub use recompute_progress::CompletionEngine;
pub use schedule_recompute::{RecomputeScheduler, DEFAULT_RECOMPUTE_DELAY};
