//! Completed test attempts and their per-question outcomes.

use crate::identifiers::{AccountId, QuestionId, ResultDetailId, ResultId, TestId, UserTestId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether a result refers to an authored test or a user-assembled one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestAccess {
    Public,
    Private,
}

impl TestAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

/// Test a result was taken against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "access", content = "id", rename_all = "snake_case")]
pub enum TestReference {
    Public(TestId),
    Private(UserTestId),
}

impl TestReference {
    pub fn access(&self) -> TestAccess {
        match self {
            Self::Public(_) => TestAccess::Public,
            Self::Private(_) => TestAccess::Private,
        }
    }

    /// Raw UUID of the referenced test, whichever table it lives in
    pub fn uuid(&self) -> uuid::Uuid {
        match self {
            Self::Public(id) => id.into_uuid(),
            Self::Private(id) => id.into_uuid(),
        }
    }
}

/// Outcome of a single answered question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionState {
    Right,
    Wrong,
}

impl QuestionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Wrong => "wrong",
        }
    }

    pub fn is_right(&self) -> bool {
        matches!(self, Self::Right)
    }
}

/// One completed attempt at a test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: ResultId,
    pub account_id: AccountId,
    pub test: TestReference,
    /// Number of correct answers recorded so far
    pub score: u32,
    /// Wall-clock time the attempt took
    pub complete_time: Duration,
    pub created_at: DateTime<Utc>,
}

/// Per-question outcome within a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDetail {
    pub id: ResultDetailId,
    pub result_id: ResultId,
    /// 1-based position in submission order, unique within the result
    pub question_order: u32,
    pub question_id: QuestionId,
    pub user_answer: String,
    pub state: QuestionState,
}
