//! Testing utilities for the IELTS practice platform
//!
//! This crate provides:
//! - Test fixtures for all domain types
//! - Builders for linked content and for user tests and results
//! - In-memory implementations of every repository port
//! - Proptest strategies for domain values
//!
//! # Examples
//!
//! ```
//! use ielts_domain::QuestionListType;
//! use ielts_testing::ContentBuilder;
//!
//! let mut content = ContentBuilder::new();
//! let test_id = content.reading_test(&[
//!     (QuestionListType::Matching, 13),
//!     (QuestionListType::TrueFalse, 14),
//!     (QuestionListType::Complete, 13),
//! ]);
//! let store = content.build();
//! assert!(store.test(test_id).is_some());
//! ```

pub mod builders;
pub mod fixtures;
pub mod mocks;
pub mod strategies;

// Re-export commonly used types
pub use builders::*;
pub use fixtures::*;
pub use mocks::*;

// Re-export testing dependencies for convenience
pub use fake;
pub use proptest;
