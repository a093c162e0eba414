//! Result Service
//!
//! Records finished attempts against public or user tests. Scores start at
//! zero and are filled in by the scoring engine.

use super::{EventPublisher, ServiceContext, ServiceEvent};
use crate::ports::{ContentRepository, ResultRepository, UserTestRepository};
use crate::validation::{RecordResultRequest, Validatable};
use chrono::{DateTime, Utc};
use ielts_common::ExamConfig;
use ielts_domain::{
    AccountId, AppResult, NotFoundError, ResultDetail, ResultId, ScoringError, Skill,
    TestReference, TestResult,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Result service implementation
pub struct ResultService<C, U, R, E>
where
    C: ContentRepository,
    U: UserTestRepository,
    R: ResultRepository,
    E: EventPublisher,
{
    content: Arc<C>,
    user_tests: Arc<U>,
    results: Arc<R>,
    event_publisher: Arc<E>,
    config: ExamConfig,
}

impl<C, U, R, E> ResultService<C, U, R, E>
where
    C: ContentRepository,
    U: UserTestRepository,
    R: ResultRepository,
    E: EventPublisher,
{
    pub fn new(
        content: Arc<C>,
        user_tests: Arc<U>,
        results: Arc<R>,
        event_publisher: Arc<E>,
        config: ExamConfig,
    ) -> Self {
        Self {
            content,
            user_tests,
            results,
            event_publisher,
            config,
        }
    }

    /// Record a finished attempt with a zero score
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id, account_id = %request.account_id))]
    pub async fn record(
        &self,
        ctx: &ServiceContext,
        request: RecordResultRequest,
        now: DateTime<Utc>,
    ) -> AppResult<TestResult> {
        request.validate_all().ensure_valid()?;

        let skill = self.resolve_skill(request.account_id, request.test).await?;
        let limit_minutes = self.time_limit_minutes(skill);
        if request.complete_time > Duration::from_secs(u64::from(limit_minutes) * 60) {
            warn!(
                complete_time_secs = request.complete_time.as_secs(),
                limit_minutes, "Attempt exceeded the time limit"
            );
            return Err(ScoringError::CompletionTimeExceeded {
                actual: request.complete_time,
                limit_minutes,
            }
            .into());
        }

        let result = TestResult {
            id: ResultId::new(),
            account_id: request.account_id,
            test: request.test,
            score: 0,
            complete_time: request.complete_time,
            created_at: now,
        };
        self.results.create(&result).await?;

        self.event_publisher
            .publish(ServiceEvent::ResultRecorded {
                result_id: result.id,
            })
            .await?;

        info!(result_id = %result.id, access = request.test.access().as_str(), "Result recorded");

        Ok(result)
    }

    pub async fn get(&self, id: ResultId) -> AppResult<TestResult> {
        self.results
            .get(id)
            .await?
            .ok_or_else(|| NotFoundError::Result(id).into())
    }

    /// Results of an account, newest first
    pub async fn list_for_account(&self, account_id: AccountId) -> AppResult<Vec<TestResult>> {
        let mut results = self.results.list_by_account(account_id).await?;
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(results)
    }

    /// Per-question outcomes of a result in question order
    pub async fn details(&self, id: ResultId) -> AppResult<Vec<ResultDetail>> {
        self.get(id).await?;
        let mut details = self.results.details(id).await?;
        details.sort_by_key(|detail| detail.question_order);
        Ok(details)
    }

    pub fn time_limit_minutes(&self, skill: Skill) -> u32 {
        match skill {
            Skill::Reading => self.config.reading_time_minutes,
            Skill::Listening => self.config.listening_time_minutes,
        }
    }

    /// Skill of the attempted test. User tests must belong to the account.
    async fn resolve_skill(&self, account_id: AccountId, test: TestReference) -> AppResult<Skill> {
        match test {
            TestReference::Public(test_id) => self
                .content
                .get_test(test_id)
                .await?
                .map(|test| test.skill)
                .ok_or_else(|| NotFoundError::Test(test_id).into()),
            TestReference::Private(user_test_id) => self
                .user_tests
                .get(user_test_id)
                .await?
                .filter(|user_test| user_test.account_id == account_id)
                .map(|user_test| user_test.skill)
                .ok_or_else(|| NotFoundError::UserTest(user_test_id).into()),
        }
    }
}
