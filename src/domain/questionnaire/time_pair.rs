//! TimePair value object - a start/end time capture.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

const TIME_FORMAT: &str = "%H:%M";
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Start and end times as entered (`HH:MM`), either side may be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePair {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

impl TimePair {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// True when neither time has been entered.
    pub fn is_empty(&self) -> bool {
        self.start.trim().is_empty() && self.end.trim().is_empty()
    }

    /// Minutes from start to end; an end before the start wraps past midnight.
    ///
    /// Returns `None` until both sides hold a valid time.
    pub fn duration_minutes(&self) -> Option<i64> {
        let start = parse_time("start", &self.start).ok()?;
        let end = parse_time("end", &self.end).ok()?;
        let minutes = (end - start).num_minutes();
        Some(if minutes < 0 {
            minutes + MINUTES_PER_DAY
        } else {
            minutes
        })
    }

    /// Signed difference between the captured duration and `expected_minutes`.
    ///
    /// Positive when the session overran, negative when it finished early.
    pub fn deviation_minutes(&self, expected_minutes: i64) -> Option<i64> {
        self.duration_minutes().map(|actual| actual - expected_minutes)
    }

    /// Validates both sides, allowing blanks.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("start", &self.start), ("end", &self.end)] {
            if !value.trim().is_empty() {
                parse_time(field, value)?;
            }
        }
        Ok(())
    }
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|e| ValidationError::invalid_format(field, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_counts_minutes_between_times() {
        assert_eq!(TimePair::new("09:00", "17:30").duration_minutes(), Some(510));
    }

    #[test]
    fn end_before_start_wraps_midnight() {
        assert_eq!(TimePair::new("22:00", "01:00").duration_minutes(), Some(180));
    }

    #[test]
    fn deviation_is_signed() {
        let pair = TimePair::new("09:00", "16:45");
        assert_eq!(pair.deviation_minutes(480), Some(-15));
        assert_eq!(pair.deviation_minutes(420), Some(45));
    }

    #[test]
    fn incomplete_pair_has_no_duration() {
        assert_eq!(TimePair::new("09:00", "").duration_minutes(), None);
        assert_eq!(TimePair::new("9am", "10:00").duration_minutes(), None);
    }

    #[test]
    fn validate_allows_blanks_but_not_garbage() {
        assert!(TimePair::new("", "").validate().is_ok());
        assert!(TimePair::new("08:15", "").validate().is_ok());
        assert!(TimePair::new("25:99", "").validate().is_err());
    }

    #[test]
    fn missing_json_fields_default_to_blank() {
        let pair: TimePair = serde_json::from_str(r#"{"start":"10:00"}"#).unwrap();
        assert_eq!(pair, TimePair::new("10:00", ""));
        assert!(!pair.is_empty());
    }
}
