//! Question definition - one field of a questionnaire document.

use serde::{Deserialize, Serialize};

use super::InputType;
use crate::domain::foundation::{DocumentId, QuestionId};

/// A question as configured on a document.
///
/// Questions are immutable while responses are being captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub document_id: DocumentId,
    /// Unique within the document; keys the response rows.
    pub field_name: String,
    pub input_type: InputType,
    pub section: String,
    pub required: bool,
    /// Role allowed to edit; `None` means anyone.
    pub role: Option<String>,
    /// Upload questions accept several files when set.
    pub allow_multiple: bool,
    pub position: i64,
}

impl Question {
    /// True for an upload question that stores a list of files.
    pub fn is_multi_upload(&self) -> bool {
        self.input_type == InputType::Upload && self.allow_multiple
    }

    /// Checks whether `role` may edit this question.
    pub fn editable_by(&self, role: &str) -> bool {
        match &self.role {
            Some(required) if !required.trim().is_empty() => {
                required.trim().eq_ignore_ascii_case(role.trim())
            }
            _ => true,
        }
    }

    /// Day ordinal encoded in the field name, for signature grid days.
    pub fn day_ordinal(&self) -> Option<u32> {
        day_ordinal(&self.field_name)
    }
}

/// Extracts the day number from names like `day_3_signature` or `attendanceDay12`.
///
/// The first run of digits after the word "day" (separators `_`, `-` or
/// space allowed in between) is the ordinal.
pub fn day_ordinal(field_name: &str) -> Option<u32> {
    let lower = field_name.to_ascii_lowercase();
    let mut search_from = 0;
    while let Some(found) = lower[search_from..].find("day") {
        let after = search_from + found + 3;
        let digits: String = lower[after..]
            .trim_start_matches(['_', '-', ' '])
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(day) = digits.parse::<u32>() {
            return Some(day);
        }
        search_from = after;
    }
    None
}
