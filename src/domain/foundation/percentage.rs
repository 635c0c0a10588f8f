//! Percentage value object (0-100 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A value between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(u8);

impl Percentage {
    /// Zero percent.
    pub const ZERO: Self = Self(0);

    /// One hundred percent.
    pub const HUNDRED: Self = Self(100);

    /// Creates a new Percentage, clamping to valid range.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Creates a Percentage, returning error if out of range.
    pub fn try_new(value: i64) -> Result<Self, ValidationError> {
        if !(0..=100).contains(&value) {
            return Err(ValidationError::out_of_range(
                "percentage",
                0,
                100,
                value.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            ));
        }
        Ok(Self(value as u8))
    }

    /// Share of `part` in `whole`, rounded half up to the nearest integer.
    ///
    /// An empty `whole` is vacuously complete.
    pub fn from_ratio(part: usize, whole: usize) -> Self {
        if whole == 0 {
            return Self::HUNDRED;
        }
        let part = part.min(whole) as u64;
        let whole = whole as u64;
        Self(((200 * part + whole) / (2 * whole)) as u8)
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns the value as a fraction (0.0 to 1.0).
    pub fn as_fraction(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn percentage_new_clamps_to_100() {
        assert_eq!(Percentage::new(101).value(), 100);
        assert_eq!(Percentage::new(255).value(), 100);
    }

    #[test]
    fn percentage_try_new_rejects_out_of_range() {
        match Percentage::try_new(101) {
            Err(ValidationError::OutOfRange { field, min, max, actual }) => {
                assert_eq!(field, "percentage");
                assert_eq!(min, 0);
                assert_eq!(max, 100);
                assert_eq!(actual, 101);
            }
            other => panic!("Expected OutOfRange error, got {:?}", other),
        }
        assert!(Percentage::try_new(-1).is_err());
        assert_eq!(Percentage::try_new(43).unwrap().value(), 43);
    }

    #[test]
    fn from_ratio_rounds_three_of_seven_to_43() {
        assert_eq!(Percentage::from_ratio(3, 7).value(), 43);
    }

    #[test]
    fn from_ratio_rounds_half_up() {
        // 1/8 = 12.5%
        assert_eq!(Percentage::from_ratio(1, 8).value(), 13);
        // 1/3 = 33.33%
        assert_eq!(Percentage::from_ratio(1, 3).value(), 33);
        // 2/3 = 66.67%
        assert_eq!(Percentage::from_ratio(2, 3).value(), 67);
    }

    #[test]
    fn from_ratio_with_empty_whole_is_hundred() {
        assert_eq!(Percentage::from_ratio(0, 0), Percentage::HUNDRED);
    }

    #[test]
    fn percentage_displays_correctly() {
        assert_eq!(format!("{}", Percentage::new(75)), "75%");
        assert_eq!(format!("{}", Percentage::ZERO), "0%");
    }

    #[test]
    fn percentage_serializes_to_json() {
        let json = serde_json::to_string(&Percentage::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    proptest! {
        #[test]
        fn from_ratio_matches_float_rounding(whole in 1usize..500, part in 0usize..500) {
            let part = part.min(whole);
            let expected = (100.0 * part as f64 / whole as f64).round() as u8;
            prop_assert_eq!(Percentage::from_ratio(part, whole).value(), expected);
        }
    }
}
