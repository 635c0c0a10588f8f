//! Trainee scope - who a document instance belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TraineeId;

/// Trainee id stored in response rows for course-level documents.
pub const WHOLE_EVENT_SENTINEL: i64 = -1;

/// Scope of a document instance within an event.
///
/// Candidate documents are filled in once per trainee; course documents
/// once for the whole event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraineeScope {
    Trainee(TraineeId),
    WholeEvent,
}

impl TraineeScope {
    /// Value of the `responses.trainee_id` column.
    pub fn response_column(&self) -> i64 {
        match self {
            TraineeScope::Trainee(id) => id.as_i64(),
            TraineeScope::WholeEvent => WHOLE_EVENT_SENTINEL,
        }
    }

    /// Value of the nullable `document_progress.trainee_id` column.
    pub fn progress_column(&self) -> Option<i64> {
        match self {
            TraineeScope::Trainee(id) => Some(id.as_i64()),
            TraineeScope::WholeEvent => None,
        }
    }

    /// Reads a scope back from a `responses.trainee_id` value.
    pub fn from_response_column(value: i64) -> Self {
        if value == WHOLE_EVENT_SENTINEL {
            TraineeScope::WholeEvent
        } else {
            TraineeScope::Trainee(TraineeId::new(value))
        }
    }

    /// Reads a scope back from a nullable `document_progress.trainee_id` value.
    pub fn from_progress_column(value: Option<i64>) -> Self {
        match value {
            Some(id) => TraineeScope::Trainee(TraineeId::new(id)),
            None => TraineeScope::WholeEvent,
        }
    }

    /// Returns the trainee, if candidate-scoped.
    pub fn trainee(&self) -> Option<TraineeId> {
        match self {
            TraineeScope::Trainee(id) => Some(*id),
            TraineeScope::WholeEvent => None,
        }
    }
}

impl fmt::Display for TraineeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraineeScope::Trainee(id) => write!(f, "trainee {}", id),
            TraineeScope::WholeEvent => write!(f, "whole event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_event_uses_sentinel_for_responses_and_null_for_progress() {
        let scope = TraineeScope::WholeEvent;
        assert_eq!(scope.response_column(), WHOLE_EVENT_SENTINEL);
        assert_eq!(scope.progress_column(), None);
    }

    #[test]
    fn trainee_scope_round_trips_through_both_columns() {
        let scope = TraineeScope::Trainee(TraineeId::new(17));
        assert_eq!(TraineeScope::from_response_column(scope.response_column()), scope);
        assert_eq!(TraineeScope::from_progress_column(scope.progress_column()), scope);
    }

    #[test]
    fn sentinel_reads_back_as_whole_event() {
        assert_eq!(
            TraineeScope::from_response_column(WHOLE_EVENT_SENTINEL),
            TraineeScope::WholeEvent
        );
    }
}
