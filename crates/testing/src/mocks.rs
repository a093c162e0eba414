//! Mock implementations for repositories and external services.
//!
//! Provides in-memory implementations of every repository port for testing
//! without a database. All state sits behind one lock, and each atomic port
//! operation holds the write guard for its whole duration.

use async_trait::async_trait;
use ielts_application::ports::{ContentRepository, ResultRepository, UserTestRepository};
use ielts_application::services::{EventPublisher, ServiceEvent};
use ielts_domain::{
    AccountId, AppError, AppResult, AssemblyError, Explanation, ListeningSection, NotFoundError,
    Question, QuestionId, QuestionList, ReadingSection, ResultDetail, ResultId, ScoringError,
    SectionId, Sound, SoundId, Test, TestAccess, TestId, TestReference, TestResult, UserTest,
    UserTestDetail, UserTestDetailId, UserTestId,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Mock event publisher that records every published event
#[derive(Clone, Default)]
pub struct RecordingEventPublisher {
    published_events: Arc<RwLock<Vec<ServiceEvent>>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_published_events(&self) -> Vec<ServiceEvent> {
        self.published_events.read().clone()
    }

    pub fn clear(&self) {
        self.published_events.write().clear();
    }

    pub fn event_count(&self) -> usize {
        self.published_events.read().len()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: ServiceEvent) -> AppResult<()> {
        self.published_events.write().push(event);
        Ok(())
    }
}

#[derive(Default)]
struct StoreState {
    tests: HashMap<TestId, Test>,
    reading_sections: Vec<ReadingSection>,
    sounds: Vec<Sound>,
    listening_sections: Vec<ListeningSection>,
    question_lists: Vec<QuestionList>,
    questions: HashMap<QuestionId, Question>,
    explanations: HashMap<QuestionId, Explanation>,
    user_tests: HashMap<UserTestId, UserTest>,
    user_test_details: Vec<UserTestDetail>,
    results: HashMap<ResultId, TestResult>,
    result_details: Vec<ResultDetail>,
}

/// In-memory store implementing the content, user test and result ports
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding

    pub fn insert_test(&self, test: Test) {
        self.state.write().tests.insert(test.id, test);
    }

    pub fn insert_reading_section(&self, section: ReadingSection) {
        self.state.write().reading_sections.push(section);
    }

    pub fn insert_sound(&self, sound: Sound) {
        self.state.write().sounds.push(sound);
    }

    pub fn insert_listening_section(&self, section: ListeningSection) {
        self.state.write().listening_sections.push(section);
    }

    pub fn insert_question_list(&self, list: QuestionList) {
        self.state.write().question_lists.push(list);
    }

    pub fn insert_question(&self, question: Question) {
        self.state.write().questions.insert(question.id, question);
    }

    pub fn insert_explanation(&self, explanation: Explanation) {
        self.state
            .write()
            .explanations
            .insert(explanation.question_id, explanation);
    }

    pub fn insert_user_test(&self, user_test: UserTest) {
        self.state.write().user_tests.insert(user_test.id, user_test);
    }

    pub fn insert_result(&self, result: TestResult) {
        self.state.write().results.insert(result.id, result);
    }

    // Inspection

    pub fn test(&self, id: TestId) -> Option<Test> {
        self.state.read().tests.get(&id).cloned()
    }

    pub fn result(&self, id: ResultId) -> Option<TestResult> {
        self.state.read().results.get(&id).cloned()
    }

    pub fn user_test_detail_count(&self) -> usize {
        self.state.read().user_test_details.len()
    }

    pub fn result_detail_count(&self) -> usize {
        self.state.read().result_details.len()
    }
}

#[async_trait]
impl ContentRepository for InMemoryStore {
    async fn get_test(&self, id: TestId) -> AppResult<Option<Test>> {
        Ok(self.state.read().tests.get(&id).cloned())
    }

    async fn list_question_lists(&self) -> AppResult<Vec<QuestionList>> {
        Ok(self.state.read().question_lists.clone())
    }

    async fn reading_sections_for_test(&self, test_id: TestId) -> AppResult<Vec<ReadingSection>> {
        Ok(self
            .state
            .read()
            .reading_sections
            .iter()
            .filter(|section| section.test_id == test_id)
            .cloned()
            .collect())
    }

    async fn sound_for_test(&self, test_id: TestId) -> AppResult<Option<Sound>> {
        Ok(self
            .state
            .read()
            .sounds
            .iter()
            .find(|sound| sound.test_id == test_id)
            .cloned())
    }

    async fn list_listening_sections(&self) -> AppResult<Vec<ListeningSection>> {
        Ok(self.state.read().listening_sections.clone())
    }

    async fn listening_sections_for_sound(
        &self,
        sound_id: SoundId,
    ) -> AppResult<Vec<ListeningSection>> {
        let mut sections: Vec<ListeningSection> = self
            .state
            .read()
            .listening_sections
            .iter()
            .filter(|section| section.sound_id == sound_id)
            .cloned()
            .collect();
        sections.sort_by_key(|section| section.order);
        Ok(sections)
    }

    async fn get_question(&self, id: QuestionId) -> AppResult<Option<Question>> {
        Ok(self.state.read().questions.get(&id).cloned())
    }

    async fn explanation_for_question(&self, id: QuestionId) -> AppResult<Option<Explanation>> {
        Ok(self.state.read().explanations.get(&id).cloned())
    }
}

#[async_trait]
impl UserTestRepository for InMemoryStore {
    async fn create(&self, user_test: &UserTest) -> AppResult<()> {
        let mut state = self.state.write();
        if state.user_tests.contains_key(&user_test.id) {
            return Err(AppError::Conflict(format!(
                "User test {} already exists",
                user_test.id
            )));
        }
        state.user_tests.insert(user_test.id, user_test.clone());
        Ok(())
    }

    async fn get(&self, id: UserTestId) -> AppResult<Option<UserTest>> {
        Ok(self.state.read().user_tests.get(&id).cloned())
    }

    async fn find_by_name(
        &self,
        account_id: AccountId,
        name: &str,
    ) -> AppResult<Option<UserTest>> {
        Ok(self
            .state
            .read()
            .user_tests
            .values()
            .find(|user_test| user_test.account_id == account_id && user_test.name == name)
            .cloned())
    }

    async fn list_by_account(&self, account_id: AccountId) -> AppResult<Vec<UserTest>> {
        Ok(self
            .state
            .read()
            .user_tests
            .values()
            .filter(|user_test| user_test.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn rename(&self, id: UserTestId, name: &str) -> AppResult<()> {
        let mut state = self.state.write();
        let user_test = state
            .user_tests
            .get_mut(&id)
            .ok_or(NotFoundError::UserTest(id))?;
        user_test.name = name.to_string();
        Ok(())
    }

    async fn details(&self, id: UserTestId) -> AppResult<Vec<UserTestDetail>> {
        Ok(self
            .state
            .read()
            .user_test_details
            .iter()
            .filter(|detail| detail.user_test_id == id)
            .cloned()
            .collect())
    }

    async fn assign_sections(
        &self,
        id: UserTestId,
        section_ids: &[SectionId],
    ) -> AppResult<Vec<UserTestDetail>> {
        let mut state = self.state.write();
        if !state.user_tests.contains_key(&id) {
            return Err(NotFoundError::UserTest(id).into());
        }
        if state
            .user_test_details
            .iter()
            .any(|detail| detail.user_test_id == id)
        {
            return Err(AssemblyError::AlreadyAssembled(id).into());
        }

        let details: Vec<UserTestDetail> = section_ids
            .iter()
            .map(|section_id| UserTestDetail {
                id: UserTestDetailId::new(),
                user_test_id: id,
                section_id: *section_id,
            })
            .collect();
        state.user_test_details.extend(details.iter().cloned());
        Ok(details)
    }

    async fn delete_cascade(&self, id: UserTestId) -> AppResult<bool> {
        let mut state = self.state.write();
        if state.user_tests.remove(&id).is_none() {
            return Ok(false);
        }

        state
            .user_test_details
            .retain(|detail| detail.user_test_id != id);

        let orphaned: HashSet<ResultId> = state
            .results
            .values()
            .filter(|result| result.test == TestReference::Private(id))
            .map(|result| result.id)
            .collect();
        state.results.retain(|result_id, _| !orphaned.contains(result_id));
        state
            .result_details
            .retain(|detail| !orphaned.contains(&detail.result_id));

        Ok(true)
    }
}

#[async_trait]
impl ResultRepository for InMemoryStore {
    async fn create(&self, result: &TestResult) -> AppResult<()> {
        let mut state = self.state.write();
        if state.results.contains_key(&result.id) {
            return Err(AppError::Conflict(format!(
                "Result {} already exists",
                result.id
            )));
        }

        if let TestReference::Public(test_id) = result.test {
            let test = state
                .tests
                .get_mut(&test_id)
                .ok_or(NotFoundError::Test(test_id))?;
            test.completed_count += 1;
        }

        state.results.insert(result.id, result.clone());
        Ok(())
    }

    async fn get(&self, id: ResultId) -> AppResult<Option<TestResult>> {
        Ok(self.state.read().results.get(&id).cloned())
    }

    async fn list_by_account(&self, account_id: AccountId) -> AppResult<Vec<TestResult>> {
        Ok(self
            .state
            .read()
            .results
            .values()
            .filter(|result| result.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn list_public(&self) -> AppResult<Vec<TestResult>> {
        Ok(self
            .state
            .read()
            .results
            .values()
            .filter(|result| result.test.access() == TestAccess::Public)
            .cloned()
            .collect())
    }

    async fn details(&self, result_id: ResultId) -> AppResult<Vec<ResultDetail>> {
        Ok(self
            .state
            .read()
            .result_details
            .iter()
            .filter(|detail| detail.result_id == result_id)
            .cloned()
            .collect())
    }

    async fn record_outcomes(
        &self,
        result_id: ResultId,
        details: &[ResultDetail],
    ) -> AppResult<u32> {
        let mut state = self.state.write();
        if !state.results.contains_key(&result_id) {
            return Err(NotFoundError::Result(result_id).into());
        }

        let mut taken: HashSet<u32> = state
            .result_details
            .iter()
            .filter(|detail| detail.result_id == result_id)
            .map(|detail| detail.question_order)
            .collect();
        for detail in details {
            if !taken.insert(detail.question_order) {
                return Err(ScoringError::DuplicateQuestionOrder {
                    result_id,
                    order: detail.question_order,
                }
                .into());
            }
        }

        let right = details.iter().filter(|d| d.state.is_right()).count() as u32;
        state.result_details.extend(details.iter().cloned());

        let result = state
            .results
            .get_mut(&result_id)
            .ok_or(NotFoundError::Result(result_id))?;
        result.score += right;
        Ok(result.score)
    }
}
