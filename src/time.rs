//! Clocks and elapsed-time arithmetic.
//!
//! Ages are computed against an injected [`Clock`] so that quotes can be
//! evaluated "as of" a fixed instant in tests and replays.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Calendar format of stored dates of birth.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
///
/// # Examples
///
/// ```
/// use quote_join_model::{Clock, FixedClock};
///
/// let clock = FixedClock::on_date(2014, 4, 1).unwrap();
/// assert_eq!(clock.now().format("%Y-%m-%d").to_string(), "2014-04-01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Freezes the clock at `at`.
    #[must_use]
    pub const fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Freezes the clock at midnight UTC on the given date.
    ///
    /// Returns `None` if the date does not exist.
    #[must_use]
    pub fn on_date(year: i32, month: u32, day: u32) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        Some(Self(date.and_hms_opt(0, 0, 0)?.and_utc()))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Unit for elapsed-time queries.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AgeUnit {
    #[default]
    Years,
    Months,
    Weeks,
    Days,
}

/// Parses a date in strict `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns `ValidationError::InvalidValue` if the string is not a zero-padded
/// calendar date.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ValidationError> {
    if raw.len() != 10 {
        return Err(ValidationError::invalid_value(field, raw));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ValidationError::invalid_value(field, raw))
}

/// Formats a date the way it is stored.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Whole units elapsed from `since` to `now`, floored.
///
/// Months count completed calendar months (a month completes on the same
/// day-of-month); years are completed months divided by twelve. Dates in the
/// future yield negative values.
#[must_use]
pub fn elapsed(since: NaiveDate, now: NaiveDate, unit: AgeUnit) -> i64 {
    match unit {
        AgeUnit::Years => whole_months(since, now).div_euclid(12),
        AgeUnit::Months => whole_months(since, now),
        AgeUnit::Weeks => (now - since).num_days().div_euclid(7),
        AgeUnit::Days => (now - since).num_days(),
    }
}

fn whole_months(since: NaiveDate, now: NaiveDate) -> i64 {
    let mut months = i64::from(now.year() - since.year()) * 12
        + i64::from(now.month()) - i64::from(since.month());
    // A partial month rounds towards the past in both directions.
    if now.day() < since.day() {
        months -= 1;
    }
    months
}
