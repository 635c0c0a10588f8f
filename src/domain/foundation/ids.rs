//! Strongly-typed identifier value objects.
//!
//! All identifiers mirror integer primary keys in the relational store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Identifier of a scheduled course event (one delivery of a course).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    /// Creates an EventId from a row id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner row id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_row_id("event_id", s).map(Self)
    }
}

/// Identifier of a questionnaire document definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(i64);

impl DocumentId {
    /// Creates a DocumentId from a row id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner row id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_row_id("document_id", s).map(Self)
    }
}

/// Identifier of a trainee (candidate) enrolled on an event.
///
/// Serializes as a bare integer so it can key JSON grid objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraineeId(i64);

impl TraineeId {
    /// Creates a TraineeId from a row id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner row id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TraineeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TraineeId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_row_id("trainee_id", s).map(Self)
    }
}

/// Identifier of a single question definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(i64);

impl QuestionId {
    /// Creates a QuestionId from a row id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the inner row id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn parse_row_id(field: &str, s: &str) -> Result<i64, ValidationError> {
    s.trim()
        .parse::<i64>()
        .map_err(|e| ValidationError::invalid_format(field, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_their_row_id() {
        assert_eq!(EventId::new(12).to_string(), "12");
        assert_eq!(DocumentId::new(3).to_string(), "3");
        assert_eq!(TraineeId::new(-1).to_string(), "-1");
    }

    #[test]
    fn ids_parse_from_strings() {
        assert_eq!("42".parse::<EventId>().unwrap(), EventId::new(42));
        assert_eq!(" 7 ".parse::<TraineeId>().unwrap(), TraineeId::new(7));
    }

    #[test]
    fn ids_reject_non_numeric_strings() {
        let err = "abc".parse::<DocumentId>().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn trainee_id_serializes_as_number() {
        let json = serde_json::to_string(&TraineeId::new(9)).unwrap();
        assert_eq!(json, "9");
    }
}
