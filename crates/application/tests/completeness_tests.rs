//! Tests for test completeness validation

use ielts_application::services::{ServiceContext, TestAssembler, TestCompletenessValidator};
use ielts_application::validation::AssemblyRequest;
use ielts_common::ExamConfig;
use ielts_domain::{
    AccountId, AppError, CompletenessError, QuestionListType::*, Skill, TestReference,
};
use ielts_testing::{seeded_rng, ContentBuilder, InMemoryStore, RecordingEventPublisher, UserTestBuilder};
use std::sync::Arc;

fn validator(store: &InMemoryStore) -> TestCompletenessValidator<InMemoryStore, InMemoryStore> {
    TestCompletenessValidator::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        ExamConfig::default().required_question_count,
    )
}

#[tokio::test]
async fn test_reading_test_with_forty_questions() {
    let mut content = ContentBuilder::new();
    let test_id = content.reading_test(&[(Matching, 13), (TrueFalse, 14), (Complete, 13)]);
    let store = content.build();

    let report = validator(&store)
        .validate(TestReference::Public(test_id))
        .await
        .unwrap();

    assert_eq!(report.skill, Skill::Reading);
    assert_eq!(report.question_count, 40);
}

#[tokio::test]
async fn test_reading_test_one_short() {
    let mut content = ContentBuilder::new();
    let test_id = content.reading_test(&[(Matching, 13), (TrueFalse, 13), (Complete, 13)]);
    let store = content.build();

    let err = validator(&store)
        .validate(TestReference::Public(test_id))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Completeness(CompletenessError::IncompleteTest {
            actual: 39,
            required: 40
        })
    ));
}

#[tokio::test]
async fn test_lists_of_other_tests_are_ignored() {
    let mut content = ContentBuilder::new();
    let test_id = content.reading_test(&[(Matching, 20), (TrueFalse, 20)]);
    content.reading_test(&[(Complete, 13)]);
    content.listening_test(&[(Complete, 10)]);
    let store = content.build();

    let report = validator(&store)
        .validate(TestReference::Public(test_id))
        .await
        .unwrap();

    assert_eq!(report.question_count, 40);
}

#[tokio::test]
async fn test_listening_test_counts_sound_sections() {
    let mut content = ContentBuilder::new();
    let (test_id, _) =
        content.listening_test(&[(Complete, 10), (Matching, 10), (MultipleChoice, 10), (Diagram, 10)]);
    let store = content.build();

    let report = validator(&store)
        .validate(TestReference::Public(test_id))
        .await
        .unwrap();

    assert_eq!(report.skill, Skill::Listening);
    assert_eq!(report.question_count, 40);
}

#[tokio::test]
async fn test_listening_test_without_sound() {
    let mut content = ContentBuilder::new();
    let test_id = content.test(Skill::Listening);
    let store = content.build();

    let err = validator(&store)
        .validate(TestReference::Public(test_id))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Completeness(CompletenessError::NoSoundAttached(id)) if id == test_id
    ));
}

#[tokio::test]
async fn test_unknown_public_test() {
    let store = InMemoryStore::new();

    let err = validator(&store)
        .validate(TestReference::Public(ielts_domain::TestId::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_assembled_user_test() {
    // Arrange
    let mut content = ContentBuilder::new();
    content.reading_test(&[(Matching, 13), (TrueFalse, 14), (Complete, 13)]);
    let store = content.build();
    let user_test = UserTestBuilder::new(AccountId::new()).build();
    store.insert_user_test(user_test.clone());

    let assembler = TestAssembler::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(RecordingEventPublisher::new()),
    );
    assembler
        .assemble_reading(
            &ServiceContext::new("test"),
            AssemblyRequest::new(user_test.id, vec![Matching, TrueFalse, Complete]),
            &mut seeded_rng(9),
        )
        .await
        .unwrap();

    // Act
    let report = validator(&store)
        .validate(TestReference::Private(user_test.id))
        .await
        .unwrap();

    // Assert
    assert_eq!(report.question_count, 40);
}

#[tokio::test]
async fn test_empty_user_test_is_incomplete() {
    let store = InMemoryStore::new();
    let user_test = UserTestBuilder::new(AccountId::new()).build();
    store.insert_user_test(user_test.clone());

    let err = validator(&store)
        .validate(TestReference::Private(user_test.id))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Completeness(CompletenessError::IncompleteTest { actual: 0, .. })
    ));
}
