//! IELTS Practice Platform Domain Types
//!
//! This crate provides the core domain model for the IELTS practice-test platform.
//! It defines test content (tests, sections, sounds, question lists, questions),
//! user activity (user tests, results, result details), band scores and the error
//! taxonomy shared by every layer.
//!
//! ## Architecture
//!
//! The domain layer is organized into the following modules:
//!
//! - **identifiers**: Strongly-typed UUID-based identifiers for all entities
//! - **content**: Authored test content and user-assembled tests
//! - **result**: Completed attempts and their per-question outcomes
//! - **band**: IELTS band scores and the raw-score conversion table
//! - **errors**: Error types with error codes and HTTP status codes
//!
//! ## Usage
//!
//! ```rust
//! use ielts_domain::{BandScore, QuestionListType};
//!
//! let band = BandScore::from_raw_score(30);
//! assert_eq!(band.to_string(), "7.5");
//!
//! let list_type: QuestionListType = "true_false".parse().unwrap();
//! assert_eq!(list_type, QuestionListType::TrueFalse);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod band;
pub mod content;
pub mod errors;
pub mod identifiers;
pub mod result;

// Re-export commonly used types
pub use band::BandScore;
pub use content::{
    Explanation, ListeningSection, Question, QuestionList, QuestionListType, ReadingSection,
    Skill, Sound, Test, TestType, UserTest, UserTestDetail,
};
pub use errors::{
    AppError, AppResult, AssemblyError, CompletenessError, DatabaseError, NotFoundError,
    ScoringError, StatisticsError, ValidationError,
};
pub use identifiers::*;
pub use result::{QuestionState, ResultDetail, TestAccess, TestReference, TestResult};
