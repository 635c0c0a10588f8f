//! ResponseValue - typed view of a stored response value.
//!
//! The store keeps every value as text. Decoding happens once, at the
//! store boundary, driven by the question's input type; the rest of the
//! crate works with this union.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{CommentEntry, InputType, Question, TimePair};
use crate::domain::foundation::{TraineeId, ValidationError};

/// Cell value stored against a trainee in signature grids when absent.
pub const ABSENT: &str = "absent";

/// Cell value stored against a trainee in signature grids when skipped.
pub const SKIP: &str = "skip";

/// Three-way toggle; neutral until answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    Yes,
    No,
    Neutral,
}

impl TriState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriState::Yes => "yes",
            TriState::No => "no",
            TriState::Neutral => "neutral",
        }
    }

    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" => TriState::Yes,
            "no" | "false" => TriState::No,
            _ => TriState::Neutral,
        }
    }
}

/// Value held for one trainee in a grid question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridCell {
    Flag(bool),
    Text(String),
}

impl GridCell {
    pub fn absent() -> Self {
        GridCell::Text(ABSENT.to_string())
    }

    pub fn skip() -> Self {
        GridCell::Text(SKIP.to_string())
    }

    /// Exactly the `absent` sentinel.
    pub fn is_absent(&self) -> bool {
        matches!(self, GridCell::Text(s) if s == ABSENT)
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, GridCell::Text(s) if s == SKIP)
    }

    fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(GridCell::Flag(b)),
            serde_json::Value::String(s) => Some(GridCell::Text(s)),
            other => Some(GridCell::Text(other.to_string())),
        }
    }
}

/// Per-trainee cells of a grid question.
pub type TraineeGrid = BTreeMap<TraineeId, GridCell>;

/// Decoded response value, tagged by the shape its input type demands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResponseValue {
    Flag(bool),
    TriState(TriState),
    Text(String),
    Files(Vec<String>),
    Grid(TraineeGrid),
    TimePair(TimePair),
    Comments(Vec<CommentEntry>),
}

impl ResponseValue {
    /// Value written when a response row is first created.
    pub fn initial_for(question: &Question) -> Self {
        match question.input_type {
            InputType::YesNo => ResponseValue::TriState(TriState::Neutral),
            _ => ResponseValue::Text(String::new()),
        }
    }

    /// Empty value of the right shape, used when stored data is unreadable.
    pub fn empty_for(question: &Question) -> Self {
        match question.input_type {
            InputType::Checkbox => ResponseValue::Flag(false),
            InputType::YesNo => ResponseValue::TriState(TriState::Neutral),
            InputType::Upload if question.allow_multiple => ResponseValue::Files(Vec::new()),
            t if t.is_trainee_grid() => ResponseValue::Grid(TraineeGrid::new()),
            InputType::TimePair => ResponseValue::TimePair(TimePair::default()),
            InputType::DynamicComments => ResponseValue::Comments(Vec::new()),
            _ => ResponseValue::Text(String::new()),
        }
    }

    /// Decodes stored text for `question`.
    ///
    /// Blank text decodes to the empty shape, except a checkbox, which stays
    /// unset text rather than an explicit `false`. Malformed JSON is an error;
    /// callers substitute [`ResponseValue::empty_for`].
    pub fn decode(question: &Question, raw: &str) -> Result<Self, ValidationError> {
        let field = question.field_name.as_str();
        let blank = raw.trim().is_empty();
        let value = match question.input_type {
            // A never-ticked box has no stored text and stays unanswered
            InputType::Checkbox if blank => ResponseValue::Text(String::new()),
            InputType::Checkbox => {
                ResponseValue::Flag(matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1"))
            }
            InputType::YesNo => ResponseValue::TriState(TriState::parse(raw)),
            InputType::Upload if question.allow_multiple => {
                if blank {
                    ResponseValue::Files(Vec::new())
                } else {
                    ResponseValue::Files(parse_json(field, raw)?)
                }
            }
            t if t.is_trainee_grid() => {
                if blank {
                    ResponseValue::Grid(TraineeGrid::new())
                } else {
                    ResponseValue::Grid(parse_grid(field, raw)?)
                }
            }
            InputType::TimePair => {
                if blank {
                    ResponseValue::TimePair(TimePair::default())
                } else {
                    ResponseValue::TimePair(parse_json(field, raw)?)
                }
            }
            InputType::DynamicComments => {
                if blank {
                    ResponseValue::Comments(Vec::new())
                } else {
                    ResponseValue::Comments(parse_json(field, raw)?)
                }
            }
            _ => ResponseValue::Text(raw.to_string()),
        };
        Ok(value)
    }

    /// Text written to the store.
    pub fn encode(&self) -> String {
        match self {
            ResponseValue::Flag(b) => b.to_string(),
            ResponseValue::TriState(t) => t.as_str().to_string(),
            ResponseValue::Text(s) => s.clone(),
            ResponseValue::Files(files) => to_json(files),
            ResponseValue::Grid(grid) => to_json(grid),
            ResponseValue::TimePair(pair) => to_json(pair),
            ResponseValue::Comments(entries) => to_json(entries),
        }
    }

    /// Canonical text used by the fallback completeness rule.
    ///
    /// A stored boolean renders as `"true"`/`"false"`, so an explicit
    /// `false` counts as answered. Unanswered shapes (neutral toggle, empty
    /// grid or log, blank time pair) render as the empty string.
    pub fn string_form(&self) -> String {
        match self {
            ResponseValue::Flag(b) => b.to_string(),
            ResponseValue::TriState(TriState::Neutral) => String::new(),
            ResponseValue::TriState(t) => t.as_str().to_string(),
            ResponseValue::Text(s) => s.clone(),
            ResponseValue::Files(files) if files.is_empty() => String::new(),
            ResponseValue::Grid(grid) if grid.is_empty() => String::new(),
            ResponseValue::TimePair(pair) if pair.is_empty() => String::new(),
            ResponseValue::Comments(entries) if entries.is_empty() => String::new(),
            other => other.encode(),
        }
    }

    /// Grid cells, if this is a grid value.
    pub fn as_grid(&self) -> Option<&TraineeGrid> {
        match self {
            ResponseValue::Grid(grid) => Some(grid),
            _ => None,
        }
    }

    /// Checks that the value has the shape `question` expects.
    pub fn matches(&self, question: &Question) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(&ResponseValue::empty_for(question))
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(field: &str, raw: &str) -> Result<T, ValidationError> {
    serde_json::from_str(raw).map_err(|e| ValidationError::invalid_format(field, e.to_string()))
}

/// Grid JSON is read leniently per cell: unknown trainee keys and nulls are
/// dropped, numbers become text.
fn parse_grid(field: &str, raw: &str) -> Result<TraineeGrid, ValidationError> {
    let object: BTreeMap<String, serde_json::Value> = parse_json(field, raw)?;
    Ok(object
        .into_iter()
        .filter_map(|(key, value)| {
            let trainee = key.trim().parse::<i64>().ok().map(TraineeId::new)?;
            GridCell::from_json(value).map(|cell| (trainee, cell))
        })
        .collect())
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
