//! Calendar-date helpers shared by the pipeline, the registry and the notices.
//!
//! Everything is a `NaiveDate`: no time of day, no timezone, no business-day rules.
//! ISO `YYYY-MM-DD` is the stored and wire form; `dd/mm/yyyy` is only produced when
//! rendering for people.

use chrono::{Datelike, Duration, Months, NaiveDate};

use super::domain::Stage;

pub const ISO_FORMAT: &str = "%Y-%m-%d";
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{raw}' is not a date in YYYY-MM-DD or dd/mm/yyyy form")]
pub struct DateParseError {
    pub raw: String,
}

pub fn add_days(start: NaiveDate, days: u32) -> NaiveDate {
    start + Duration::days(i64::from(days))
}

/// Deadline for a stage that opens on `start`.
pub fn stage_deadline(start: NaiveDate, stage: Stage) -> NaiveDate {
    add_days(start, stage.duration_days())
}

/// Month arithmetic clamps to the last day of shorter months (29 Feb + 12 months = 28 Feb).
pub fn add_months(start: NaiveDate, months: u32) -> NaiveDate {
    start
        .checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Signed whole days from `today` until `target`; negative once the target has passed.
pub fn days_until(today: NaiveDate, target: NaiveDate) -> i64 {
    (target - today).num_days()
}

/// Calendar-month difference that ignores the day of month.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

pub fn whole_years_between(from: NaiveDate, to: NaiveDate) -> u32 {
    (months_between(from, to) / 12).max(0) as u32
}

pub fn format_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, ISO_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, DISPLAY_FORMAT))
        .map_err(|_| DateParseError {
            raw: raw.to_string(),
        })
}
