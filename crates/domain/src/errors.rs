//! Error types for the IELTS practice domain.
//!
//! This module defines the error hierarchy for all core operations, providing
//! structured error information with HTTP status codes and error codes for API
//! responses. Every variant carries enough context (attempted types, actual
//! question count, the missing id) to explain the failure to an end user.

use crate::content::{QuestionListType, Skill};
use crate::identifiers::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Test assembly errors
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// Test completeness errors
    #[error("Completeness error: {0}")]
    Completeness(#[from] CompletenessError),

    /// Scoring errors
    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    /// Statistics errors
    #[error("Statistics error: {0}")]
    Statistics(#[from] StatisticsError),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    /// Validation-related errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Resource conflict (e.g., duplicate name)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the error code for this error
    ///
    /// Error codes are used in API responses for programmatic error handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Assembly(AssemblyError::SkillMismatch { .. }) => "SKILL_MISMATCH",
            Self::Assembly(AssemblyError::NoMatchingSections { .. }) => "NO_MATCHING_SECTIONS",
            Self::Assembly(AssemblyError::AlreadyAssembled(_)) => "ALREADY_ASSEMBLED",
            Self::Completeness(CompletenessError::IncompleteTest { .. }) => "INCOMPLETE_TEST",
            Self::Completeness(CompletenessError::NoSoundAttached(_)) => "NO_SOUND_ATTACHED",
            Self::Scoring(_) => "SCORING_ERROR",
            Self::Statistics(StatisticsError::InvalidTimeWindow { .. }) => "INVALID_TIME_WINDOW",
            Self::Statistics(StatisticsError::NoResultsInWindow) => "NO_RESULTS_IN_WINDOW",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Statistics(StatisticsError::InvalidTimeWindow { .. }) => 400,
            Self::NotFound(_) => 404,
            Self::Completeness(CompletenessError::NoSoundAttached(_)) => 404,
            Self::Scoring(ScoringError::QuestionNotFound(_))
            | Self::Scoring(ScoringError::MissingExplanation(_)) => 404,
            Self::Conflict(_) => 409,
            Self::Assembly(AssemblyError::AlreadyAssembled(_)) => 409,
            Self::Scoring(ScoringError::DuplicateQuestionOrder { .. })
            | Self::Scoring(ScoringError::AlreadyScored(_)) => 409,
            Self::Assembly(_) | Self::Completeness(_) | Self::Statistics(_) | Self::Scoring(_) => 422,
            Self::Database(_) => 503,
            Self::Internal(_) => 500,
        }
    }

    /// Check if this error is retryable
    ///
    /// Only storage failures are transient. Constraint-unsatisfiable outcomes
    /// need a different request, not another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

/// Test assembly errors
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// User test skill differs from the requested assembly
    #[error("User test {user_test_id} is a {actual} test, not {expected}")]
    SkillMismatch {
        user_test_id: UserTestId,
        expected: Skill,
        actual: Skill,
    },

    /// No content satisfies the requested type mix
    #[error("No {skill} sections match the requested types {}", format_types(.types))]
    NoMatchingSections {
        skill: Skill,
        types: Vec<QuestionListType>,
    },

    /// User test already has selected sections
    #[error("User test {0} has already been assembled")]
    AlreadyAssembled(UserTestId),
}

fn format_types(types: &[QuestionListType]) -> String {
    let names: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
    format!("[{}]", names.join(", "))
}

/// Test completeness errors
#[derive(Debug, thiserror::Error)]
pub enum CompletenessError {
    /// Linked question lists do not add up to the required total
    #[error("The test should consist of {required} questions, found {actual}")]
    IncompleteTest { actual: u32, required: u32 },

    /// Listening test has no sound
    #[error("No sound attached to test {0}")]
    NoSoundAttached(TestId),
}

/// Scoring errors
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// Referenced question does not exist
    #[error("Question not found: {0}")]
    QuestionNotFound(QuestionId),

    /// Question has no explanation to score against
    #[error("No explanation for question {0}")]
    MissingExplanation(QuestionId),

    /// No submitted answer for a question position
    #[error("No answer submitted for question order {order}")]
    MissingAnswer { order: u32 },

    /// Result already has an outcome for this position
    #[error("Result {result_id} already has an answer for question order {order}")]
    DuplicateQuestionOrder { result_id: ResultId, order: u32 },

    /// Result already carries outcomes from an earlier batch
    #[error("Result {0} has already been scored")]
    AlreadyScored(ResultId),

    /// Attempt took longer than the skill allows
    #[error("Completion time {}s exceeds the {limit_minutes} minute limit", .actual.as_secs())]
    CompletionTimeExceeded { actual: Duration, limit_minutes: u32 },
}

/// Statistics errors
#[derive(Debug, thiserror::Error)]
pub enum StatisticsError {
    /// Time window order out of range for its frame
    #[error("Invalid {frame} order {order}: {reason}")]
    InvalidTimeWindow {
        frame: String,
        order: i64,
        reason: String,
    },

    /// Average requested over an empty window
    #[error("No results in the requested time window")]
    NoResultsInWindow,
}

/// Missing entity errors
#[derive(Debug, thiserror::Error)]
pub enum NotFoundError {
    #[error("Test not found: {0}")]
    Test(TestId),

    #[error("User test not found: {0}")]
    UserTest(UserTestId),

    #[error("Result not found: {0}")]
    Result(ResultId),
}

/// Validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Field validation failed
    #[error("Field validation failed: {field} - {message}")]
    FieldValidation { field: String, message: String },

    /// Multiple validation errors
    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<String>),
}

/// Database errors
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Query execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Transaction failed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Standardized API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

/// Detailed error information
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorDetail {
                code: error.error_code().to_string(),
                message: error.to_string(),
            },
            timestamp: Utc::now(),
        }
    }
}

/// Application-wide result type
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::from(AssemblyError::NoMatchingSections {
            skill: Skill::Reading,
            types: vec![QuestionListType::Matching, QuestionListType::TrueFalse],
        });
        assert_eq!(err.error_code(), "NO_MATCHING_SECTIONS");
        assert_eq!(err.http_status(), 422);

        let err = AppError::from(NotFoundError::Test(TestId::new()));
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.http_status(), 404);

        let err = AppError::from(AssemblyError::AlreadyAssembled(UserTestId::new()));
        assert_eq!(err.http_status(), 409);
    }

    #[test]
    fn test_messages_carry_context() {
        let err = AssemblyError::NoMatchingSections {
            skill: Skill::Listening,
            types: vec![QuestionListType::Diagram, QuestionListType::Complete],
        };
        assert_eq!(
            err.to_string(),
            "No listening sections match the requested types [diagram, complete]"
        );

        let err = CompletenessError::IncompleteTest { actual: 39, required: 40 };
        assert!(err.to_string().contains("found 39"));
    }

    #[test]
    fn test_retryable() {
        let err = AppError::Database(DatabaseError::QueryFailed("timeout".to_string()));
        assert!(err.is_retryable());

        let err = AppError::Statistics(StatisticsError::NoResultsInWindow);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_response_serialization() {
        let err = AppError::Completeness(CompletenessError::IncompleteTest {
            actual: 12,
            required: 40,
        });
        let response = ErrorResponse::from(err);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("INCOMPLETE_TEST"));
    }
}
