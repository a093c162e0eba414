//! Test Completeness Validator
//!
//! A test is gradable only when the question lists linked to its sections add
//! up to the required question total.

use crate::ports::{ContentRepository, UserTestRepository};
use ielts_domain::{
    AppResult, CompletenessError, NotFoundError, QuestionList, SectionId, Skill, TestId,
    TestReference, UserTestId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Question total of a test that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub test: TestReference,
    pub skill: Skill,
    pub question_count: u32,
}

/// Sum of question counts over lists attached to any of `sections` for `skill`
pub fn count_questions(lists: &[QuestionList], skill: Skill, sections: &HashSet<SectionId>) -> u32 {
    lists
        .iter()
        .filter(|list| {
            list.section_for(skill)
                .is_some_and(|section| sections.contains(&section))
        })
        .map(|list| list.question_count)
        .sum()
}

/// Completeness validator implementation
pub struct TestCompletenessValidator<C, U>
where
    C: ContentRepository,
    U: UserTestRepository,
{
    content: Arc<C>,
    user_tests: Arc<U>,
    required: u32,
}

impl<C, U> TestCompletenessValidator<C, U>
where
    C: ContentRepository,
    U: UserTestRepository,
{
    pub fn new(content: Arc<C>, user_tests: Arc<U>, required: u32) -> Self {
        Self {
            content,
            user_tests,
            required,
        }
    }

    /// Check that a public or user test carries exactly the required total
    #[instrument(skip(self), fields(required = self.required))]
    pub async fn validate(&self, test: TestReference) -> AppResult<CompletenessReport> {
        let (skill, question_count) = match test {
            TestReference::Public(test_id) => self.count_public(test_id).await?,
            TestReference::Private(user_test_id) => self.count_private(user_test_id).await?,
        };

        debug!(question_count, "Counted linked questions");

        if question_count != self.required {
            warn!(question_count, "Test does not carry the required question count");
            return Err(CompletenessError::IncompleteTest {
                actual: question_count,
                required: self.required,
            }
            .into());
        }

        Ok(CompletenessReport {
            test,
            skill,
            question_count,
        })
    }

    async fn count_public(&self, test_id: TestId) -> AppResult<(Skill, u32)> {
        let test = self
            .content
            .get_test(test_id)
            .await?
            .ok_or(NotFoundError::Test(test_id))?;

        let sections: HashSet<SectionId> = match test.skill {
            Skill::Reading => self
                .content
                .reading_sections_for_test(test_id)
                .await?
                .into_iter()
                .map(|section| section.id)
                .collect(),
            Skill::Listening => {
                let sound = self
                    .content
                    .sound_for_test(test_id)
                    .await?
                    .ok_or(CompletenessError::NoSoundAttached(test_id))?;
                self.content
                    .listening_sections_for_sound(sound.id)
                    .await?
                    .into_iter()
                    .map(|section| section.id)
                    .collect()
            }
        };

        let lists = self.content.list_question_lists().await?;
        Ok((test.skill, count_questions(&lists, test.skill, &sections)))
    }

    async fn count_private(&self, user_test_id: UserTestId) -> AppResult<(Skill, u32)> {
        let user_test = self
            .user_tests
            .get(user_test_id)
            .await?
            .ok_or(NotFoundError::UserTest(user_test_id))?;

        let sections: HashSet<SectionId> = self
            .user_tests
            .details(user_test_id)
            .await?
            .into_iter()
            .map(|detail| detail.section_id)
            .collect();

        let lists = self.content.list_question_lists().await?;
        Ok((
            user_test.skill,
            count_questions(&lists, user_test.skill, &sections),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ielts_domain::{QuestionListId, QuestionListType};

    fn reading_list(count: u32, section: SectionId) -> QuestionList {
        QuestionList {
            id: QuestionListId::new(),
            list_type: QuestionListType::Complete,
            question_count: count,
            content: None,
            reading_sections: vec![section],
            listening_sections: vec![],
        }
    }

    #[test]
    fn test_count_questions_only_counts_linked_sections() {
        let (s1, s2, other) = (SectionId::new(), SectionId::new(), SectionId::new());
        let lists = vec![
            reading_list(13, s1),
            reading_list(14, s2),
            reading_list(13, s2),
            reading_list(20, other),
        ];
        let sections: HashSet<SectionId> = [s1, s2].into_iter().collect();

        assert_eq!(count_questions(&lists, Skill::Reading, &sections), 40);
    }

    #[test]
    fn test_count_questions_respects_skill() {
        let section = SectionId::new();
        let lists = vec![reading_list(10, section)];
        let sections: HashSet<SectionId> = [section].into_iter().collect();

        assert_eq!(count_questions(&lists, Skill::Listening, &sections), 0);
    }
}
