//! Questionnaire module - questions, responses, and completion rules.
//!
//! # Module Organization
//!
//! - `input_type` / `question` / `catalog` - document definitions
//! - `response_value` / `response` - typed captured answers
//! - `time_pair` / `comment_log` - structured value shapes
//! - `grid` - signature grid absence cascade
//! - `completion` / `progress` - completion percentage and its record

mod catalog;
mod comment_log;
mod completion;
mod grid;
mod input_type;
mod progress;
mod question;
mod response;
mod response_value;
mod time_pair;

pub use catalog::{Catalog, Section};
pub use comment_log::CommentEntry;
pub use completion::{is_question_complete, CompletionSummary};
pub use grid::{GridUpdate, SignatureDay, SignatureGrid};
pub use input_type::InputType;
pub use progress::{ProgressKey, ProgressRecord};
pub use question::{day_ordinal, Question};
pub use response::{Response, ResponseKey, ResponseMap};
pub use response_value::{GridCell, ResponseValue, TraineeGrid, TriState, ABSENT, SKIP};
pub use time_pair::TimePair;

#[cfg(test)]
pub(crate) use question::fixtures;
