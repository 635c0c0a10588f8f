//! Signature grid cascade - absence carried forward across event days.
//!
//! Each signature grid question is one day of a multi-day event. Marking
//! a trainee absent on day N marks them absent on every later day; taking
//! the absence back clears the later days that are still exactly absent.

use super::{GridCell, TraineeGrid};
use crate::domain::foundation::{DomainError, ErrorCode, TraineeId};

/// One day's signature grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureDay {
    pub field_name: String,
    pub day: u32,
    pub cells: TraineeGrid,
}

/// Full per-trainee map to persist for one touched field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridUpdate {
    pub field_name: String,
    pub cells: TraineeGrid,
}

/// The signature grid family of one document instance.
#[derive(Debug, Clone)]
pub struct SignatureGrid {
    days: Vec<SignatureDay>,
    duration_days: Option<u32>,
}

impl SignatureGrid {
    /// Builds the family; days past `duration_days` are never cascaded into.
    pub fn new(mut days: Vec<SignatureDay>, duration_days: Option<u32>) -> Self {
        days.sort_by_key(|d| d.day);
        Self {
            days,
            duration_days,
        }
    }

    pub fn day(&self, field_name: &str) -> Option<&SignatureDay> {
        self.days.iter().find(|d| d.field_name == field_name)
    }

    fn within_duration(&self, day: u32) -> bool {
        self.duration_days.map_or(true, |max| day <= max)
    }

    /// Sets (or with `None`, clears) one trainee's cell and cascades.
    ///
    /// Returns the updated maps of every touched field, in day order; the
    /// edited field is always included.
    pub fn apply_edit(
        &mut self,
        field_name: &str,
        trainee: TraineeId,
        new_cell: Option<GridCell>,
    ) -> Result<Vec<GridUpdate>, DomainError> {
        let edited = self
            .days
            .iter()
            .position(|d| d.field_name == field_name)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::InvalidGridEdit,
                    format!("'{}' is not a signature grid day", field_name),
                )
                .with_detail("field", field_name)
            })?;
        let edited_day = self.days[edited].day;

        let was_absent = self.days[edited]
            .cells
            .get(&trainee)
            .is_some_and(GridCell::is_absent);
        let now_absent = new_cell.as_ref().is_some_and(GridCell::is_absent);

        match new_cell {
            Some(cell) => {
                self.days[edited].cells.insert(trainee, cell);
            }
            None => {
                self.days[edited].cells.remove(&trainee);
            }
        }

        let mut touched = vec![edited];
        for idx in 0..self.days.len() {
            let day = self.days[idx].day;
            if day <= edited_day || !self.within_duration(day) {
                continue;
            }
            let cells = &mut self.days[idx].cells;
            if now_absent {
                if cells.get(&trainee).is_some_and(GridCell::is_absent) {
                    continue;
                }
                cells.insert(trainee, GridCell::absent());
                touched.push(idx);
            } else if was_absent && cells.get(&trainee).is_some_and(GridCell::is_absent) {
                cells.remove(&trainee);
                touched.push(idx);
            }
        }

        touched.sort_by_key(|idx| self.days[*idx].day);
        Ok(touched
            .into_iter()
            .map(|idx| GridUpdate {
                field_name: self.days[idx].field_name.clone(),
                cells: self.days[idx].cells.clone(),
            })
            .collect())
    }
}
