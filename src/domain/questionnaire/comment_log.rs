//! Dynamic comment log entries.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, ValidationError};

/// One entry appended to a dynamic comment log question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEntry {
    #[serde(default)]
    pub author: String,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl CommentEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field("comment"));
        }
        Ok(Self {
            author: author.into(),
            text,
            created_at: Some(Timestamp::now()),
        })
    }
}
