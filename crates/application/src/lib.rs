//! Application layer for the IELTS practice platform
//!
//! This crate orchestrates domain logic and coordinates between layers.
//!
//! ## Architecture
//!
//! The application layer sits between the domain and infrastructure layers.
//! Services depend only on the repository ports declared in [`ports`]; the
//! infrastructure crate provides PostgreSQL implementations and the testing
//! crate provides in-memory ones.
//!
//! ## Modules
//!
//! - `ports` - Repository traits implemented by storage adapters
//! - `matching` - Section selection under a question-type mix
//! - `services` - Test assembly, completeness checks, user tests and results
//! - `scoring` - Answer evaluation and result scoring
//! - `statistics` - Time-windowed aggregates over results
//! - `validation` - Input validation framework

pub mod matching;
pub mod ports;
pub mod scoring;
pub mod services;
pub mod statistics;
pub mod validation;

// Re-export commonly used types
pub use matching::{ListeningAssignment, TypeConstraintMatcher};
pub use ports::{ContentRepository, ResultRepository, UserTestRepository};
pub use scoring::{
    AnswerEvaluator, EvaluatorConfig, QuestionOutcome, ScoreBatchRequest, ScoreReport,
    ScoringEngine, ScoringMode, SingleAnswerRequest, TextMatchEvaluator,
};
pub use services::{
    AssemblyOutcome, CompletenessReport, EventPublisher, NoOpEventPublisher, ResultService,
    ServiceContext, ServiceEvent, TestAssembler, TestCompletenessValidator, UserTestService,
};
pub use statistics::{
    Aggregation, BandHistogram, StatisticsAggregator, StatisticsQuery, StatisticsScope,
    StatisticsValue, TimeFrame, TimeWindow,
};
pub use validation::{Validatable, ValidationResult, ValidationRules};
