//! Time windows for statistics.
//!
//! Week and month windows select by calendar position only: week 2 matches
//! the second week of every month and month 3 matches March of every year.

use chrono::{DateTime, Datelike, Utc};
use ielts_common::week_of_month;
use ielts_domain::{StatisticsError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar granularity of a statistics query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    Week,
    Month,
    Year,
}

impl TimeFrame {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Week => "week",
            TimeFrame::Month => "month",
            TimeFrame::Year => "year",
        }
    }

    /// The frame's position of an instant: week of month, month, or year
    pub fn position_of(&self, at: &DateTime<Utc>) -> i64 {
        match self {
            TimeFrame::Week => i64::from(week_of_month(at)),
            TimeFrame::Month => i64::from(at.month()),
            TimeFrame::Year => i64::from(at.year()),
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(TimeFrame::Week),
            "month" => Ok(TimeFrame::Month),
            "year" => Ok(TimeFrame::Year),
            other => Err(ValidationError::FieldValidation {
                field: "time_frame".to_string(),
                message: format!(
                    "Time frame must be one of week, month, year; got '{}'",
                    other
                ),
            }),
        }
    }
}

/// Resolved window a result must fall in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeWindow {
    /// No restriction
    All,
    /// Week of month, 1..=5
    Week(u32),
    /// Calendar month, 1..=12
    Month(u32),
    /// Calendar year
    Year(i32),
}

impl TimeWindow {
    /// Resolve a frame and optional order against the reference instant.
    ///
    /// An omitted order defaults to the position of `now` in the frame. The
    /// order, defaulted or not, must be 1..=5 for weeks, 1..=12 for months and
    /// between `first_year` and the year of `now` for years.
    pub fn resolve(
        frame: Option<TimeFrame>,
        order: Option<i64>,
        now: DateTime<Utc>,
        first_year: i32,
    ) -> Result<Self, StatisticsError> {
        let Some(frame) = frame else {
            return Ok(TimeWindow::All);
        };

        let order = order.unwrap_or_else(|| frame.position_of(&now));
        let invalid = |reason: String| StatisticsError::InvalidTimeWindow {
            frame: frame.to_string(),
            order,
            reason,
        };

        match frame {
            TimeFrame::Week => match u32::try_from(order) {
                Ok(week @ 1..=5) => Ok(TimeWindow::Week(week)),
                _ => Err(invalid("week order must be between 1 and 5".to_string())),
            },
            TimeFrame::Month => match u32::try_from(order) {
                Ok(month @ 1..=12) => Ok(TimeWindow::Month(month)),
                _ => Err(invalid("month order must be between 1 and 12".to_string())),
            },
            TimeFrame::Year => {
                let current = now.year();
                match i32::try_from(order) {
                    Ok(year) if (first_year..=current).contains(&year) => {
                        Ok(TimeWindow::Year(year))
                    }
                    _ => Err(invalid(format!(
                        "year order must be between {} and {}",
                        first_year, current
                    ))),
                }
            }
        }
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        match self {
            TimeWindow::All => true,
            TimeWindow::Week(week) => week_of_month(at) == *week,
            TimeWindow::Month(month) => at.month() == *month,
            TimeWindow::Year(year) => at.year() == *year,
        }
    }
}
