//! DateTime utilities.
//!
//! This module provides helper functions for working with dates and times.

use chrono::Datelike;

/// Week of the month a date falls in.
///
/// The weekday of the month's first day (Monday = 1 .. Sunday = 7) gives an
/// offset of `weekday - 1`, and the week is `(day + offset) / 7 + 1`. Weeks
/// therefore turn over on Sundays. A month starting on a Sunday has no week 1
/// and begins in week 2, and the last days of a long month can reach week 6.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use ielts_common::datetime::week_of_month;
///
/// // January 2025 starts on a Wednesday
/// let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
/// assert_eq!(week_of_month(&date), 2);
/// ```
pub fn week_of_month<D: Datelike>(date: &D) -> u32 {
    let offset = first_weekday_of_month(date) - 1;
    (date.day() + offset) / 7 + 1
}

/// Weekday index (Monday = 1 .. Sunday = 7) of the first day of the date's month
fn first_weekday_of_month<D: Datelike>(date: &D) -> u32 {
    let weekday = date.weekday();
    // Walk back from the known weekday to day 1 instead of building a new date
    let days_back = (date.day() - 1) % 7;
    let from_monday = weekday.num_days_from_monday();
    (from_monday + 7 - days_back) % 7 + 1
}
