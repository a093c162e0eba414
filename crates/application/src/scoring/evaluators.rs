//! Answer evaluators.
//!
//! An evaluator decides whether a submitted answer matches the reference
//! text. The default normalizes surrounding whitespace and letter case.

use ielts_domain::QuestionState;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Evaluator trait for judging answers.
pub trait AnswerEvaluator: Send + Sync {
    /// Compare a submitted answer with the reference answer.
    fn evaluate(&self, submitted: &str, expected: &str) -> QuestionState;

    /// Get the evaluator type name.
    fn name(&self) -> &'static str;
}

/// Configuration for text comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Case sensitivity for string comparisons
    pub case_sensitive: bool,
    /// Whether to trim surrounding whitespace
    pub trim_whitespace: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            trim_whitespace: true,
        }
    }
}

/// Text match evaluator.
#[derive(Debug, Clone, Default)]
pub struct TextMatchEvaluator {
    config: EvaluatorConfig,
}

impl TextMatchEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    fn normalize<'a>(&self, value: &'a str) -> std::borrow::Cow<'a, str> {
        let value = if self.config.trim_whitespace {
            value.trim()
        } else {
            value
        };

        if self.config.case_sensitive {
            std::borrow::Cow::Borrowed(value)
        } else {
            std::borrow::Cow::Owned(value.to_lowercase())
        }
    }
}

impl AnswerEvaluator for TextMatchEvaluator {
    fn evaluate(&self, submitted: &str, expected: &str) -> QuestionState {
        let matches = self.normalize(submitted) == self.normalize(expected);
        trace!(matches, "Text match evaluation");

        if matches {
            QuestionState::Right
        } else {
            QuestionState::Wrong
        }
    }

    fn name(&self) -> &'static str {
        "text_match"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ignores_case_and_padding() {
        let evaluator = TextMatchEvaluator::default();

        assert_eq!(evaluator.evaluate("Paris ", "paris"), QuestionState::Right);
        assert_eq!(evaluator.evaluate("  TRUE", "True"), QuestionState::Right);
        assert_eq!(evaluator.evaluate("London", "Paris"), QuestionState::Wrong);
        assert_eq!(evaluator.evaluate("", "Paris"), QuestionState::Wrong);
    }

    #[test]
    fn test_inner_whitespace_is_significant() {
        let evaluator = TextMatchEvaluator::default();
        assert_eq!(
            evaluator.evaluate("new  york", "new york"),
            QuestionState::Wrong
        );
    }

    #[test]
    fn test_case_sensitive_config() {
        let evaluator = TextMatchEvaluator::new(EvaluatorConfig {
            case_sensitive: true,
            trim_whitespace: true,
        });

        assert_eq!(evaluator.evaluate("Paris ", "Paris"), QuestionState::Right);
        assert_eq!(evaluator.evaluate("paris", "Paris"), QuestionState::Wrong);
        assert_eq!(evaluator.name(), "text_match");
    }

    #[test]
    fn test_unicode_case_folding() {
        let evaluator = TextMatchEvaluator::default();
        assert_eq!(evaluator.evaluate("ÉCOLE", "école"), QuestionState::Right);
    }
}
