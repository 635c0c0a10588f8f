//! Debounce configuration for field writes and progress recomputes

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_DEBOUNCE_MS: u64 = 60_000;

/// Quiet periods applied before staged work runs.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    /// Delay after the last keystroke before a field value is written
    #[serde(default = "default_field_debounce")]
    pub field_debounce_ms: u64,

    /// Delay after the last write before a document's progress is recomputed
    #[serde(default = "default_progress_debounce")]
    pub progress_debounce_ms: u64,
}

impl SchedulingConfig {
    pub fn field_debounce(&self) -> Duration {
        Duration::from_millis(self.field_debounce_ms)
    }

    pub fn progress_debounce(&self) -> Duration {
        Duration::from_millis(self.progress_debounce_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_debounce("field_debounce_ms", self.field_debounce_ms)?;
        check_debounce("progress_debounce_ms", self.progress_debounce_ms)
    }
}

fn check_debounce(name: &'static str, value: u64) -> Result<(), ValidationError> {
    if value == 0 || value > MAX_DEBOUNCE_MS {
        return Err(ValidationError::InvalidDebounce(name));
    }
    Ok(())
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            field_debounce_ms: default_field_debounce(),
            progress_debounce_ms: default_progress_debounce(),
        }
    }
}

fn default_field_debounce() -> u64 {
    500
}

fn default_progress_debounce() -> u64 {
    250
}
