use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Id = String;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Inclusive calendar window used by the capacity analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Collapsed range on a single day
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Number of calendar days covered, counting both ends. Inverted ranges count as one day.
    pub fn calendar_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(1)
    }

    /// True when `[start, end]` shares at least one day with this range
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end && end >= self.start
    }
}

/// Whole days from `start` to `end`, both taken at end of day, plus the boundary day.
///
/// A missing `end` falls back to `start`. The result never drops below one day,
/// so an inverted pair still yields 1.
pub fn inclusive_days(start: NaiveDate, end: Option<NaiveDate>) -> i64 {
    let end = end.unwrap_or(start);
    ((end - start).num_days() + 1).max(1)
}
