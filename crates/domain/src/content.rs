//! Test content: authored tests, their sections and sounds, question lists and
//! questions, plus the user-assembled tests built from that content.

use crate::errors::ValidationError;
use crate::identifiers::*;
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Skill exercised by a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Reading,
    Listening,
}

impl Skill {
    /// Stable lowercase name used in storage and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reading => "reading",
            Self::Listening => "listening",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Skill {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reading" => Ok(Self::Reading),
            "listening" => Ok(Self::Listening),
            other => Err(ValidationError::FieldValidation {
                field: "skill".to_string(),
                message: format!("unknown skill '{}'", other),
            }),
        }
    }
}

/// IELTS module a test belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    General,
    Academic,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Academic => "academic",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Self::General),
            "academic" => Ok(Self::Academic),
            other => Err(ValidationError::FieldValidation {
                field: "test_type".to_string(),
                message: format!("unknown test type '{}'", other),
            }),
        }
    }
}

/// Presentation type shared by every question in a question list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionListType {
    MultipleChoice,
    Matching,
    TrueFalse,
    Complete,
    Diagram,
}

impl QuestionListType {
    /// All five question list types, in declaration order
    pub const ALL: [QuestionListType; 5] = [
        Self::MultipleChoice,
        Self::Matching,
        Self::TrueFalse,
        Self::Complete,
        Self::Diagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::Matching => "matching",
            Self::TrueFalse => "true_false",
            Self::Complete => "complete",
            Self::Diagram => "diagram",
        }
    }
}

impl fmt::Display for QuestionListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionListType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::FieldValidation {
                field: "types".to_string(),
                message: format!("unknown question list type '{}'", s),
            })
    }
}

/// Authored, shared test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Test {
    pub id: TestId,
    pub skill: Skill,
    pub test_type: TestType,
    pub name: String,
    pub month_edition: u32,
    pub year_edition: i32,
    /// Number of completed attempts recorded against this test
    pub completed_count: u32,
}

/// Test assembled on demand for one account from existing sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTest {
    pub id: UserTestId,
    pub account_id: AccountId,
    pub name: String,
    pub test_type: TestType,
    pub skill: Skill,
    pub created_at: DateTime<Utc>,
}

/// One section selected into a user test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTestDetail {
    pub id: UserTestDetailId,
    pub user_test_id: UserTestId,
    pub section_id: SectionId,
}

/// Reading passage belonging to one test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingSection {
    pub id: SectionId,
    pub test_id: TestId,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Audio track belonging to one test, grouping ordered listening sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sound {
    pub id: SoundId,
    pub test_id: TestId,
    pub audio: String,
}

/// Listening segment within a sound
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListeningSection {
    pub id: SectionId,
    pub sound_id: SoundId,
    /// Position within the sound, starting at 1
    pub order: u32,
    /// Offset into the audio track where the segment starts
    pub time_offset: NaiveTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

/// Group of questions sharing a presentation type
///
/// Section associations are many-to-many in storage, but in practice a list
/// belongs to at most one section of one skill. Only the first association of
/// each skill is considered when resolving which section hosts the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionList {
    pub id: QuestionListId,
    pub list_type: QuestionListType,
    /// Number of questions referencing this list
    pub question_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub reading_sections: Vec<SectionId>,
    #[serde(default)]
    pub listening_sections: Vec<SectionId>,
}

impl QuestionList {
    /// Reading section hosting this list, if any
    pub fn reading_section(&self) -> Option<SectionId> {
        self.reading_sections.first().copied()
    }

    /// Listening section hosting this list, if any
    pub fn listening_section(&self) -> Option<SectionId> {
        self.listening_sections.first().copied()
    }

    /// Hosting section for the given skill
    pub fn section_for(&self, skill: Skill) -> Option<SectionId> {
        match skill {
            Skill::Reading => self.reading_section(),
            Skill::Listening => self.listening_section(),
        }
    }
}

/// Single question of a question list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub question_list_id: QuestionListId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<String>,
    /// Canonical answer stored on the question itself
    pub answer: String,
}

/// Canonical correct-answer text for exactly one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub id: ExplanationId,
    pub question_id: QuestionId,
    pub content: String,
}
