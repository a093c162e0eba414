//! Repository ports
//!
//! Storage traits the services depend on. Operations documented as atomic must
//! either apply every write or none of them.

use async_trait::async_trait;
use ielts_domain::{
    AccountId, AppResult, Explanation, ListeningSection, Question, QuestionId, QuestionList,
    ReadingSection, ResultDetail, ResultId, SectionId, Sound, SoundId, Test, TestId, TestResult,
    UserTest, UserTestDetail, UserTestId,
};

/// Read access to authored test content
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn get_test(&self, id: TestId) -> AppResult<Option<Test>>;

    /// Every question list together with its section associations
    async fn list_question_lists(&self) -> AppResult<Vec<QuestionList>>;

    async fn reading_sections_for_test(&self, test_id: TestId) -> AppResult<Vec<ReadingSection>>;

    async fn sound_for_test(&self, test_id: TestId) -> AppResult<Option<Sound>>;

    /// Every listening section, used to resolve section-to-sound ownership
    async fn list_listening_sections(&self) -> AppResult<Vec<ListeningSection>>;

    async fn listening_sections_for_sound(
        &self,
        sound_id: SoundId,
    ) -> AppResult<Vec<ListeningSection>>;

    async fn get_question(&self, id: QuestionId) -> AppResult<Option<Question>>;

    async fn explanation_for_question(&self, id: QuestionId) -> AppResult<Option<Explanation>>;
}

/// Storage for user-assembled tests
#[async_trait]
pub trait UserTestRepository: Send + Sync {
    async fn create(&self, user_test: &UserTest) -> AppResult<()>;

    async fn get(&self, id: UserTestId) -> AppResult<Option<UserTest>>;

    async fn find_by_name(&self, account_id: AccountId, name: &str)
        -> AppResult<Option<UserTest>>;

    async fn list_by_account(&self, account_id: AccountId) -> AppResult<Vec<UserTest>>;

    async fn rename(&self, id: UserTestId, name: &str) -> AppResult<()>;

    async fn details(&self, id: UserTestId) -> AppResult<Vec<UserTestDetail>>;

    /// Atomically attach sections to a user test that has none yet.
    ///
    /// Fails with `AssemblyError::AlreadyAssembled` if detail rows already
    /// exist, and with `NotFoundError::UserTest` if the test is gone.
    async fn assign_sections(
        &self,
        id: UserTestId,
        section_ids: &[SectionId],
    ) -> AppResult<Vec<UserTestDetail>>;

    /// Atomically delete a user test with its detail rows, its results and
    /// their result details. Returns `false` when the test did not exist.
    async fn delete_cascade(&self, id: UserTestId) -> AppResult<bool>;
}

/// Storage for completed attempts
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Atomically insert a result. For a public test the test's
    /// completed-attempt counter is incremented in the same transaction.
    async fn create(&self, result: &TestResult) -> AppResult<()>;

    async fn get(&self, id: ResultId) -> AppResult<Option<TestResult>>;

    async fn list_by_account(&self, account_id: AccountId) -> AppResult<Vec<TestResult>>;

    /// Every result recorded against a public test
    async fn list_public(&self) -> AppResult<Vec<TestResult>>;

    async fn details(&self, result_id: ResultId) -> AppResult<Vec<ResultDetail>>;

    /// Atomically insert result details and add the number of right answers
    /// to the result's score. Fails with `ScoringError::DuplicateQuestionOrder`
    /// without writing anything if any order is already recorded. Returns the
    /// updated score.
    async fn record_outcomes(&self, result_id: ResultId, details: &[ResultDetail])
        -> AppResult<u32>;
}
