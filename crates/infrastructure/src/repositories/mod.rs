//! Repository implementations for data persistence.
//!
//! This module provides PostgreSQL-backed implementations of the repository
//! ports defined in the application layer.

mod content_repository;
mod result_repository;
mod user_test_repository;

pub use content_repository::*;
pub use result_repository::*;
pub use user_test_repository::*;

use crate::{Error, Result};
use std::str::FromStr;
use std::time::Duration;

/// Parse a stored enum name
fn parse_column<T: FromStr>(column: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::corrupt(format!("{} '{}'", column, value)))
}

/// Read a non-negative INTEGER column as `u32`
fn to_u32(column: &str, value: i32) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::corrupt(format!("{} {}", column, value)))
}

/// Bind a `u32` into an INTEGER column
fn to_i32(column: &str, value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::corrupt(format!("{} {} out of range", column, value)))
}

fn duration_to_millis(duration: Duration) -> Result<i64> {
    i64::try_from(duration.as_millis())
        .map_err(|_| Error::corrupt(format!("duration {:?} out of range", duration)))
}

fn millis_to_duration(millis: i64) -> Result<Duration> {
    u64::try_from(millis)
        .map(Duration::from_millis)
        .map_err(|_| Error::corrupt(format!("complete_time_ms {}", millis)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ielts_domain::{QuestionListType, Skill};

    #[test]
    fn test_parse_column() {
        let skill: Skill = parse_column("skill", "listening").unwrap();
        assert_eq!(skill, Skill::Listening);

        let err = parse_column::<QuestionListType>("list_type", "essay").unwrap_err();
        assert!(matches!(err, Error::CorruptRow(msg) if msg == "list_type 'essay'"));
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(to_u32("score", 40).unwrap(), 40);
        assert!(to_u32("score", -1).is_err());
        assert!(to_i32("score", u32::MAX).is_err());
    }

    #[test]
    fn test_duration_round_trip() {
        let duration = Duration::from_millis(2_400_500);
        assert_eq!(
            millis_to_duration(duration_to_millis(duration).unwrap()).unwrap(),
            duration
        );
        assert!(millis_to_duration(-5).is_err());
    }
}
