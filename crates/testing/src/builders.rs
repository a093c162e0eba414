//! Builders for constructing test data.
//!
//! [`ContentBuilder`] seeds an [`InMemoryStore`] with linked tests, sections,
//! sounds, question lists and questions. The entity builders follow the
//! fluent `with_*` style.

use crate::fixtures::{
    create_test_explanation, create_test_listening_section, create_test_question,
    create_test_question_list, create_test_reading_section, create_test_result, create_test_sound,
    create_test_test, create_test_user_test,
};
use crate::mocks::InMemoryStore;
use chrono::{DateTime, Utc};
use ielts_domain::{
    AccountId, QuestionId, QuestionListId, QuestionListType, SectionId, Skill, SoundId, TestId,
    TestReference, TestResult, UserTest,
};
use std::time::Duration;

/// Seeds linked content into an in-memory store
pub struct ContentBuilder {
    store: InMemoryStore,
}

impl ContentBuilder {
    pub fn new() -> Self {
        Self::on(InMemoryStore::new())
    }

    /// Seed into an existing store
    pub fn on(store: InMemoryStore) -> Self {
        Self { store }
    }

    pub fn test(&mut self, skill: Skill) -> TestId {
        let test = create_test_test(skill);
        let id = test.id;
        self.store.insert_test(test);
        id
    }

    pub fn reading_section(&mut self, test_id: TestId) -> SectionId {
        let section = create_test_reading_section(test_id);
        let id = section.id;
        self.store.insert_reading_section(section);
        id
    }

    pub fn sound(&mut self, test_id: TestId) -> SoundId {
        let sound = create_test_sound(test_id);
        let id = sound.id;
        self.store.insert_sound(sound);
        id
    }

    pub fn listening_section(&mut self, sound_id: SoundId, order: u32) -> SectionId {
        let section = create_test_listening_section(sound_id, order);
        let id = section.id;
        self.store.insert_listening_section(section);
        id
    }

    /// Attach a question list to a reading section
    pub fn reading_list(
        &mut self,
        section_id: SectionId,
        list_type: QuestionListType,
        question_count: u32,
    ) -> QuestionListId {
        self.list(Skill::Reading, section_id, list_type, question_count)
    }

    /// Attach a question list to a listening section
    pub fn listening_list(
        &mut self,
        section_id: SectionId,
        list_type: QuestionListType,
        question_count: u32,
    ) -> QuestionListId {
        self.list(Skill::Listening, section_id, list_type, question_count)
    }

    pub fn question(&mut self, list_id: QuestionListId, answer: &str) -> QuestionId {
        let question = create_test_question(list_id, answer);
        let id = question.id;
        self.store.insert_question(question);
        id
    }

    /// Add a question whose explanation carries `explanation`
    pub fn explained_question(
        &mut self,
        list_id: QuestionListId,
        answer: &str,
        explanation: &str,
    ) -> QuestionId {
        let id = self.question(list_id, answer);
        self.store
            .insert_explanation(create_test_explanation(id, explanation));
        id
    }

    /// Public reading test with one section per entry of `lists`, each
    /// holding a single list of the paired type
    pub fn reading_test(&mut self, lists: &[(QuestionListType, u32)]) -> TestId {
        let test_id = self.test(Skill::Reading);
        for (list_type, count) in lists {
            let section = self.reading_section(test_id);
            self.reading_list(section, *list_type, *count);
        }
        test_id
    }

    /// Public listening test with one sound whose sections each hold one list
    pub fn listening_test(&mut self, lists: &[(QuestionListType, u32)]) -> (TestId, SoundId) {
        let test_id = self.test(Skill::Listening);
        let sound_id = self.sound(test_id);
        for (order, (list_type, count)) in (1u32..).zip(lists) {
            let section = self.listening_section(sound_id, order);
            self.listening_list(section, *list_type, *count);
        }
        (test_id, sound_id)
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    pub fn build(self) -> InMemoryStore {
        self.store
    }

    fn list(
        &mut self,
        skill: Skill,
        section_id: SectionId,
        list_type: QuestionListType,
        question_count: u32,
    ) -> QuestionListId {
        let list = create_test_question_list(list_type, question_count, skill, section_id);
        let id = list.id;
        self.store.insert_question_list(list);
        id
    }
}

impl Default for ContentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating UserTest test instances
#[derive(Clone)]
pub struct UserTestBuilder {
    user_test: UserTest,
}

impl UserTestBuilder {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            user_test: create_test_user_test(account_id, Skill::Reading),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.user_test.name = name.into();
        self
    }

    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.user_test.skill = skill;
        self
    }

    pub fn listening(self) -> Self {
        self.with_skill(Skill::Listening)
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.user_test.created_at = created_at;
        self
    }

    pub fn build(self) -> UserTest {
        self.user_test
    }
}

/// Builder for creating TestResult test instances
#[derive(Clone)]
pub struct ResultBuilder {
    result: TestResult,
}

impl ResultBuilder {
    pub fn new(account_id: AccountId, test: TestReference) -> Self {
        Self {
            result: create_test_result(account_id, test, 0, Utc::now()),
        }
    }

    pub fn with_score(mut self, score: u32) -> Self {
        self.result.score = score;
        self
    }

    pub fn with_complete_time(mut self, complete_time: Duration) -> Self {
        self.result.complete_time = complete_time;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.result.created_at = created_at;
        self
    }

    pub fn build(self) -> TestResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ielts_application::ports::ContentRepository;
    use QuestionListType::*;

    #[tokio::test]
    async fn test_reading_test_links_every_list() {
        let mut content = ContentBuilder::new();
        let test_id = content.reading_test(&[(Matching, 13), (TrueFalse, 14), (Complete, 13)]);
        let store = content.build();

        let sections = store.reading_sections_for_test(test_id).await.unwrap();
        let lists = store.list_question_lists().await.unwrap();

        assert_eq!(sections.len(), 3);
        assert_eq!(lists.iter().map(|l| l.question_count).sum::<u32>(), 40);
    }

    #[tokio::test]
    async fn test_listening_test_orders_sections() {
        let mut content = ContentBuilder::new();
        let (_, sound_id) = content.listening_test(&[(Complete, 10), (Matching, 10)]);
        let store = content.build();

        let sections = store.listening_sections_for_sound(sound_id).await.unwrap();
        assert_eq!(
            sections.iter().map(|s| s.order).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn test_result_builder() {
        let result = ResultBuilder::new(AccountId::new(), TestReference::Public(TestId::new()))
            .with_score(30)
            .with_complete_time(Duration::from_secs(3600))
            .build();

        assert_eq!(result.score, 30);
        assert_eq!(result.complete_time, Duration::from_secs(3600));
    }
}
