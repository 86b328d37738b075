//! Payroll period model.
//!
//! This module contains the [`ReportRange`] type: the inclusive
//! `[start, end]` window whose clock-in times a payroll report covers.
//! Date inputs are resolved leniently; an absent or unparsable start
//! means "no lower bound" and an absent or unparsable end means "now".

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Date format accepted by [`ReportRange::parse`].
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive window over clock-in times.
///
/// A start later than the end is kept as-is: such a range matches no event,
/// and a report over it lists every person with zero hours.
///
/// # Example
///
/// ```
/// use dtr_payroll::models::ReportRange;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let now = day.and_hms_opt(18, 0, 0).unwrap();
/// let range = ReportRange::from_dates(Some(day), Some(day), now);
///
/// assert!(range.contains(day.and_hms_opt(0, 0, 0).unwrap()));
/// assert!(range.contains(day.and_hms_opt(23, 59, 59).unwrap()));
/// assert!(!range.contains(day.succ_opt().unwrap().and_hms_opt(0, 0, 0).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRange {
    /// Earliest clock-in included; `None` means no lower bound.
    pub start: Option<NaiveDateTime>,
    /// Latest clock-in included.
    pub end: NaiveDateTime,
}

impl ReportRange {
    /// Creates a range from explicit timestamps, defaulting the end to `now`.
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>, now: NaiveDateTime) -> Self {
        Self {
            start,
            end: end.unwrap_or(now),
        }
    }

    /// Creates a range covering whole days.
    ///
    /// The start date begins at midnight and the end date runs through its
    /// last millisecond, so a single-day range covers that entire day.
    pub fn from_dates(start: Option<NaiveDate>, end: Option<NaiveDate>, now: NaiveDateTime) -> Self {
        Self {
            start: start.map(|date| date.and_time(NaiveTime::MIN)),
            end: end.map(end_of_day).unwrap_or(now),
        }
    }

    /// Creates a range from raw `YYYY-MM-DD` request parameters.
    ///
    /// Blank or unparsable values are treated as absent.
    pub fn parse(start: Option<&str>, end: Option<&str>, now: NaiveDateTime) -> Self {
        Self::from_dates(start.and_then(parse_date), end.and_then(parse_date), now)
    }

    /// Returns true if a clock-in at `at` falls within the range.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start.is_none_or(|start| at >= start) && at <= self.end
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), REPORT_DATE_FORMAT).ok()
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    // Millisecond resolution matches what the stores keep.
    let last_millisecond =
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(last_millisecond)
}
