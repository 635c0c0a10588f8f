//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the training register domain.

mod errors;
mod ids;
mod percentage;
mod timestamp;
mod trainee_scope;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{DocumentId, EventId, QuestionId, TraineeId};
pub use percentage::Percentage;
pub use timestamp::Timestamp;
pub use trainee_scope::{TraineeScope, WHOLE_EVENT_SENTINEL};
