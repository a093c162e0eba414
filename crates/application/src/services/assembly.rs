//! Test Assembler
//!
//! Fills an empty user test with sections that cover a requested mix of
//! question list types.

use super::{EventPublisher, ServiceContext, ServiceEvent};
use crate::matching::TypeConstraintMatcher;
use crate::ports::{ContentRepository, UserTestRepository};
use crate::validation::{AssemblyRequest, Validatable};
use ielts_domain::{
    AppResult, AssemblyError, NotFoundError, SectionId, Skill, SoundId, UserTest, UserTestDetail,
    UserTestId,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// What an assembly attached to a user test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyOutcome {
    pub user_test_id: UserTestId,
    pub skill: Skill,
    /// Detail rows in selection order
    pub details: Vec<UserTestDetail>,
    /// Chosen sound for listening assemblies
    pub sound_id: Option<SoundId>,
}

impl AssemblyOutcome {
    pub fn section_ids(&self) -> Vec<SectionId> {
        self.details.iter().map(|detail| detail.section_id).collect()
    }
}

/// Test assembler implementation
pub struct TestAssembler<C, U, E>
where
    C: ContentRepository,
    U: UserTestRepository,
    E: EventPublisher,
{
    content: Arc<C>,
    user_tests: Arc<U>,
    event_publisher: Arc<E>,
    matcher: TypeConstraintMatcher,
}

impl<C, U, E> TestAssembler<C, U, E>
where
    C: ContentRepository,
    U: UserTestRepository,
    E: EventPublisher,
{
    pub fn new(content: Arc<C>, user_tests: Arc<U>, event_publisher: Arc<E>) -> Self {
        Self {
            content,
            user_tests,
            event_publisher,
            matcher: TypeConstraintMatcher::new(),
        }
    }

    /// Assemble a reading user test: one distinct section per requested type
    #[instrument(skip(self, ctx, request, rng), fields(correlation_id = %ctx.correlation_id, user_test_id = %request.user_test_id))]
    pub async fn assemble_reading<R: Rng + Send>(
        &self,
        ctx: &ServiceContext,
        request: AssemblyRequest,
        rng: &mut R,
    ) -> AppResult<AssemblyOutcome> {
        let user_test = self.prepare(&request, Skill::Reading).await?;

        let lists = self.content.list_question_lists().await?;
        let section_ids = self
            .matcher
            .match_reading(&request.types, &lists, rng)
            .map_err(|err| {
                warn!(types = ?request.types, "No reading sections match");
                err
            })?;

        self.commit(ctx, &user_test, section_ids, None).await
    }

    /// Assemble a listening user test from one sound covering the type mix
    #[instrument(skip(self, ctx, request, rng), fields(correlation_id = %ctx.correlation_id, user_test_id = %request.user_test_id))]
    pub async fn assemble_listening<R: Rng + Send>(
        &self,
        ctx: &ServiceContext,
        request: AssemblyRequest,
        rng: &mut R,
    ) -> AppResult<AssemblyOutcome> {
        let user_test = self.prepare(&request, Skill::Listening).await?;

        let lists = self.content.list_question_lists().await?;
        let sections = self.content.list_listening_sections().await?;
        let assignment = self
            .matcher
            .match_listening(&request.types, &lists, &sections, rng)
            .map_err(|err| {
                warn!(types = ?request.types, "No listening sound matches");
                err
            })?;

        self.commit(ctx, &user_test, assignment.sections, Some(assignment.sound_id))
            .await
    }

    /// Validate the request and load the target user test
    async fn prepare(&self, request: &AssemblyRequest, skill: Skill) -> AppResult<UserTest> {
        request.validate_all().ensure_valid()?;

        let user_test = self
            .user_tests
            .get(request.user_test_id)
            .await?
            .ok_or(NotFoundError::UserTest(request.user_test_id))?;

        if user_test.skill != skill {
            return Err(AssemblyError::SkillMismatch {
                user_test_id: user_test.id,
                expected: skill,
                actual: user_test.skill,
            }
            .into());
        }

        if !self.user_tests.details(user_test.id).await?.is_empty() {
            return Err(AssemblyError::AlreadyAssembled(user_test.id).into());
        }

        Ok(user_test)
    }

    async fn commit(
        &self,
        ctx: &ServiceContext,
        user_test: &UserTest,
        section_ids: Vec<SectionId>,
        sound_id: Option<SoundId>,
    ) -> AppResult<AssemblyOutcome> {
        let details = self
            .user_tests
            .assign_sections(user_test.id, &section_ids)
            .await?;

        self.event_publisher
            .publish(ServiceEvent::UserTestAssembled {
                user_test_id: user_test.id,
                skill: user_test.skill,
                section_count: details.len(),
            })
            .await?;

        info!(
            correlation_id = %ctx.correlation_id,
            skill = %user_test.skill,
            sections = details.len(),
            "User test assembled"
        );

        Ok(AssemblyOutcome {
            user_test_id: user_test.id,
            skill: user_test.skill,
            details,
            sound_id,
        })
    }
}
