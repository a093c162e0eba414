//! Scoring engine implementation.
//!
//! Scores a completed attempt by comparing submitted answers with reference
//! answers and persisting one detail row per question.

use super::evaluators::{AnswerEvaluator, TextMatchEvaluator};
use crate::ports::{ContentRepository, ResultRepository};
use crate::services::{EventPublisher, ServiceContext, ServiceEvent};
use crate::validation::{Validatable, ValidationResult};
use ielts_domain::{
    AppResult, NotFoundError, QuestionId, QuestionState, ResultDetail, ResultDetailId, ResultId,
    ScoringError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Where the reference answer for a question comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// The question's explanation text
    Explanation,
    /// The question's answer field
    AnswerField,
}

/// Batch of answers for a result.
///
/// `question_ids[i]` is the question at order `i + 1`; `answers` is keyed by
/// that 1-based order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBatchRequest {
    pub result_id: ResultId,
    pub question_ids: Vec<QuestionId>,
    pub answers: BTreeMap<u32, String>,
    pub mode: ScoringMode,
}

impl Validatable for ScoreBatchRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = ValidationResult::success();

        if self.question_ids.is_empty() {
            result.add_field_error("question_ids", "At least one question is required");
        }

        let last = self.question_ids.len() as u32;
        for order in self.answers.keys() {
            if *order == 0 || *order > last {
                result.add_field_error(
                    "answers",
                    format!("Answer order {} is outside 1..={}", order, last),
                );
            }
        }

        result
    }
}

/// One answer scored against the explanation of its question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleAnswerRequest {
    pub result_id: ResultId,
    pub question_order: u32,
    pub question_id: QuestionId,
    pub answer: String,
}

impl Validatable for SingleAnswerRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        if self.question_order == 0 {
            result.add_field_error("question_order", "Question order starts at 1");
        }
        result
    }
}

/// Outcome of a single question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_order: u32,
    pub question_id: QuestionId,
    pub user_answer: String,
    pub state: QuestionState,
}

/// Outcome of a scored batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub result_id: ResultId,
    /// Outcomes in question order
    pub outcomes: Vec<QuestionOutcome>,
    /// Right answers in this batch
    pub correct: u32,
    /// Result score after the batch was applied
    pub score: u32,
}

/// Pair each question with its submitted answer, in order.
///
/// Fails on the first order without an answer.
pub fn ordered_answers<'a>(
    question_ids: &[QuestionId],
    answers: &'a BTreeMap<u32, String>,
) -> Result<Vec<(u32, QuestionId, &'a str)>, ScoringError> {
    question_ids
        .iter()
        .zip(1u32..)
        .map(|(question_id, order)| {
            answers
                .get(&order)
                .map(|answer| (order, *question_id, answer.as_str()))
                .ok_or(ScoringError::MissingAnswer { order })
        })
        .collect()
}

/// Main scoring engine.
pub struct ScoringEngine<C, R, E>
where
    C: ContentRepository,
    R: ResultRepository,
    E: EventPublisher,
{
    content: Arc<C>,
    results: Arc<R>,
    event_publisher: Arc<E>,
    evaluator: Arc<dyn AnswerEvaluator>,
}

impl<C, R, E> ScoringEngine<C, R, E>
where
    C: ContentRepository,
    R: ResultRepository,
    E: EventPublisher,
{
    /// Create a scoring engine with the default text match evaluator.
    pub fn new(content: Arc<C>, results: Arc<R>, event_publisher: Arc<E>) -> Self {
        Self {
            content,
            results,
            event_publisher,
            evaluator: Arc::new(TextMatchEvaluator::default()),
        }
    }

    /// Replace the evaluator.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn AnswerEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Score every answer of a result in one atomic write.
    ///
    /// All reference answers are resolved before anything is stored, so a
    /// missing question or explanation leaves the result untouched.
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id, result_id = %request.result_id, mode = ?request.mode))]
    pub async fn score_batch(
        &self,
        ctx: &ServiceContext,
        request: ScoreBatchRequest,
    ) -> AppResult<ScoreReport> {
        request.validate_all().ensure_valid()?;
        self.ensure_result_exists(request.result_id).await?;

        if !self.results.details(request.result_id).await?.is_empty() {
            return Err(ScoringError::AlreadyScored(request.result_id).into());
        }

        let answers = ordered_answers(&request.question_ids, &request.answers)?;

        let mut outcomes = Vec::with_capacity(answers.len());
        for (order, question_id, answer) in answers {
            let expected = self.reference_answer(question_id, request.mode).await?;
            outcomes.push(QuestionOutcome {
                question_order: order,
                question_id,
                user_answer: answer.to_string(),
                state: self.evaluator.evaluate(answer, &expected),
            });
        }

        let details: Vec<ResultDetail> = outcomes
            .iter()
            .map(|outcome| to_detail(request.result_id, outcome))
            .collect();
        let score = self
            .results
            .record_outcomes(request.result_id, &details)
            .await?;

        let correct = outcomes.iter().filter(|o| o.state.is_right()).count() as u32;

        self.event_publisher
            .publish(ServiceEvent::ResultScored {
                result_id: request.result_id,
                score,
            })
            .await?;

        info!(
            questions = outcomes.len(),
            correct,
            score,
            evaluator = self.evaluator.name(),
            "Result scored"
        );

        Ok(ScoreReport {
            result_id: request.result_id,
            outcomes,
            correct,
            score,
        })
    }

    /// Score one answer against its question's explanation and store it
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id, result_id = %request.result_id, order = request.question_order))]
    pub async fn score_answer(
        &self,
        ctx: &ServiceContext,
        request: SingleAnswerRequest,
    ) -> AppResult<QuestionOutcome> {
        request.validate_all().ensure_valid()?;
        self.ensure_result_exists(request.result_id).await?;

        let taken = self
            .results
            .details(request.result_id)
            .await?
            .iter()
            .any(|detail| detail.question_order == request.question_order);
        if taken {
            return Err(ScoringError::DuplicateQuestionOrder {
                result_id: request.result_id,
                order: request.question_order,
            }
            .into());
        }

        let expected = self
            .reference_answer(request.question_id, ScoringMode::Explanation)
            .await?;
        let outcome = QuestionOutcome {
            question_order: request.question_order,
            question_id: request.question_id,
            state: self.evaluator.evaluate(&request.answer, &expected),
            user_answer: request.answer,
        };

        let score = self
            .results
            .record_outcomes(request.result_id, &[to_detail(request.result_id, &outcome)])
            .await?;

        self.event_publisher
            .publish(ServiceEvent::ResultScored {
                result_id: request.result_id,
                score,
            })
            .await?;

        debug!(state = outcome.state.as_str(), score, "Answer scored");

        Ok(outcome)
    }

    async fn ensure_result_exists(&self, result_id: ResultId) -> AppResult<()> {
        self.results
            .get(result_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| NotFoundError::Result(result_id).into())
    }

    async fn reference_answer(&self, question_id: QuestionId, mode: ScoringMode) -> AppResult<String> {
        let question = self
            .content
            .get_question(question_id)
            .await?
            .ok_or(ScoringError::QuestionNotFound(question_id))?;

        match mode {
            ScoringMode::AnswerField => Ok(question.answer),
            ScoringMode::Explanation => self
                .content
                .explanation_for_question(question_id)
                .await?
                .map(|explanation| explanation.content)
                .ok_or_else(|| ScoringError::MissingExplanation(question_id).into()),
        }
    }
}

fn to_detail(result_id: ResultId, outcome: &QuestionOutcome) -> ResultDetail {
    ResultDetail {
        id: ResultDetailId::new(),
        result_id,
        question_order: outcome.question_order,
        question_id: outcome.question_id,
        user_answer: outcome.user_answer.clone(),
        state: outcome.state,
    }
}
