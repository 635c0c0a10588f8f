//! InputType enum - the kinds of question a document can ask.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Input type of a question, as stored in `questions.input_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Checkbox,
    YesNo,
    Text,
    Textarea,
    Number,
    Date,
    Time,
    Dropdown,
    Radio,
    Signature,
    TraineeTextGrid,
    TraineeCheckboxGrid,
    TraineeDateGrid,
    TraineeDropdownGrid,
    SignatureGrid,
    TimePair,
    DynamicComments,
    Upload,
    CompetencyGrid,
}

impl InputType {
    /// Returns every input type.
    pub fn all() -> &'static [InputType] {
        &[
            InputType::Checkbox,
            InputType::YesNo,
            InputType::Text,
            InputType::Textarea,
            InputType::Number,
            InputType::Date,
            InputType::Time,
            InputType::Dropdown,
            InputType::Radio,
            InputType::Signature,
            InputType::TraineeTextGrid,
            InputType::TraineeCheckboxGrid,
            InputType::TraineeDateGrid,
            InputType::TraineeDropdownGrid,
            InputType::SignatureGrid,
            InputType::TimePair,
            InputType::DynamicComments,
            InputType::Upload,
            InputType::CompetencyGrid,
        ]
    }

    /// Identifier used in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Checkbox => "checkbox",
            InputType::YesNo => "yes_no",
            InputType::Text => "text",
            InputType::Textarea => "textarea",
            InputType::Number => "number",
            InputType::Date => "date",
            InputType::Time => "time",
            InputType::Dropdown => "dropdown",
            InputType::Radio => "radio",
            InputType::Signature => "signature",
            InputType::TraineeTextGrid => "trainee_text_grid",
            InputType::TraineeCheckboxGrid => "trainee_checkbox_grid",
            InputType::TraineeDateGrid => "trainee_date_grid",
            InputType::TraineeDropdownGrid => "trainee_dropdown_grid",
            InputType::SignatureGrid => "signature_grid",
            InputType::TimePair => "time_pair",
            InputType::DynamicComments => "dynamic_comments",
            InputType::Upload => "upload",
            InputType::CompetencyGrid => "competency_grid",
        }
    }

    /// True for the per-trainee grid family (signature grid included).
    pub fn is_trainee_grid(&self) -> bool {
        matches!(
            self,
            InputType::TraineeTextGrid
                | InputType::TraineeCheckboxGrid
                | InputType::TraineeDateGrid
                | InputType::TraineeDropdownGrid
                | InputType::SignatureGrid
        )
    }

    /// True for inputs whose options come from `question_options`.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            InputType::Dropdown | InputType::Radio | InputType::TraineeDropdownGrid
        )
    }

    /// True for the competency meta-question handled outside the form.
    pub fn is_meta(&self) -> bool {
        matches!(self, InputType::CompetencyGrid)
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InputType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        InputType::all()
            .iter()
            .find(|t| t.as_str() == normalized)
            .copied()
            .ok_or_else(|| {
                ValidationError::invalid_format("input_type", format!("unknown input type '{}'", s))
            })
    }
}
