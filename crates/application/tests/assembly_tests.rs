//! Tests for test assembly
//!
//! Covers reading and listening assembly, skill checks, unsatisfiable type
//! mixes and re-assembly of an already assembled user test.

use ielts_application::services::{ServiceContext, ServiceEvent, TestAssembler};
use ielts_application::validation::AssemblyRequest;
use ielts_domain::{
    AccountId, AppError, AssemblyError, QuestionListType::*, Skill, UserTest,
};
use ielts_testing::{seeded_rng, ContentBuilder, InMemoryStore, RecordingEventPublisher, UserTestBuilder};
use std::collections::HashSet;
use std::sync::Arc;

fn assembler(
    store: &InMemoryStore,
    publisher: &RecordingEventPublisher,
) -> TestAssembler<InMemoryStore, InMemoryStore, RecordingEventPublisher> {
    TestAssembler::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(publisher.clone()),
    )
}

fn empty_user_test(store: &InMemoryStore, skill: Skill) -> UserTest {
    let user_test = UserTestBuilder::new(AccountId::new())
        .with_skill(skill)
        .build();
    store.insert_user_test(user_test.clone());
    user_test
}

#[tokio::test]
async fn test_assemble_reading_picks_distinct_sections() {
    // Arrange
    let mut content = ContentBuilder::new();
    content.reading_test(&[(Matching, 13), (TrueFalse, 14), (Complete, 13)]);
    content.reading_test(&[(Matching, 13), (Diagram, 14), (Complete, 13)]);
    let store = content.build();
    let publisher = RecordingEventPublisher::new();
    let user_test = empty_user_test(&store, Skill::Reading);

    // Act
    let outcome = assembler(&store, &publisher)
        .assemble_reading(
            &ServiceContext::new("corr-1"),
            AssemblyRequest::new(user_test.id, vec![Matching, Complete, TrueFalse]),
            &mut seeded_rng(7),
        )
        .await
        .unwrap();

    // Assert
    let sections = outcome.section_ids();
    assert_eq!(sections.len(), 3);
    assert_eq!(sections.iter().collect::<HashSet<_>>().len(), 3);
    assert_eq!(outcome.sound_id, None);
    assert_eq!(store.user_test_detail_count(), 3);
    assert_eq!(
        publisher.get_published_events(),
        vec![ServiceEvent::UserTestAssembled {
            user_test_id: user_test.id,
            skill: Skill::Reading,
            section_count: 3,
        }]
    );
}

#[tokio::test]
async fn test_assemble_reading_is_reproducible_with_seed() {
    let mut content = ContentBuilder::new();
    for _ in 0..4 {
        content.reading_test(&[(Matching, 13), (Complete, 14), (Diagram, 13)]);
    }
    let store = content.build();
    let publisher = RecordingEventPublisher::new();
    let ctx = ServiceContext::generate();

    let first = empty_user_test(&store, Skill::Reading);
    let second = empty_user_test(&store, Skill::Reading);
    let service = assembler(&store, &publisher);

    let a = service
        .assemble_reading(&ctx, AssemblyRequest::new(first.id, vec![Matching, Complete]), &mut seeded_rng(42))
        .await
        .unwrap();
    let b = service
        .assemble_reading(&ctx, AssemblyRequest::new(second.id, vec![Matching, Complete]), &mut seeded_rng(42))
        .await
        .unwrap();

    assert_eq!(a.section_ids(), b.section_ids());
}

#[tokio::test]
async fn test_assemble_reading_without_match() {
    let mut content = ContentBuilder::new();
    content.reading_test(&[(Matching, 20), (TrueFalse, 20)]);
    let store = content.build();
    let publisher = RecordingEventPublisher::new();
    let user_test = empty_user_test(&store, Skill::Reading);

    let err = assembler(&store, &publisher)
        .assemble_reading(
            &ServiceContext::generate(),
            AssemblyRequest::new(user_test.id, vec![Diagram]),
            &mut seeded_rng(1),
        )
        .await
        .unwrap_err();

    match err {
        AppError::Assembly(AssemblyError::NoMatchingSections { skill, types }) => {
            assert_eq!(skill, Skill::Reading);
            assert_eq!(types, vec![Diagram]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.user_test_detail_count(), 0);
    assert_eq!(publisher.event_count(), 0);
}

#[tokio::test]
async fn test_assemble_rejects_skill_mismatch() {
    let store = ContentBuilder::new().build();
    let publisher = RecordingEventPublisher::new();
    let user_test = empty_user_test(&store, Skill::Listening);

    let err = assembler(&store, &publisher)
        .assemble_reading(
            &ServiceContext::generate(),
            AssemblyRequest::new(user_test.id, vec![Matching]),
            &mut seeded_rng(1),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Assembly(AssemblyError::SkillMismatch {
            expected: Skill::Reading,
            actual: Skill::Listening,
            ..
        })
    ));
}

#[tokio::test]
async fn test_assemble_rejects_bad_type_lists() {
    let store = ContentBuilder::new().build();
    let publisher = RecordingEventPublisher::new();
    let user_test = empty_user_test(&store, Skill::Reading);
    let service = assembler(&store, &publisher);
    let ctx = ServiceContext::generate();

    for types in [vec![], vec![Matching, Matching, Complete, Diagram, TrueFalse]] {
        let err = service
            .assemble_reading(&ctx, AssemblyRequest::new(user_test.id, types), &mut seeded_rng(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

#[tokio::test]
async fn test_assemble_twice_is_rejected() {
    let mut content = ContentBuilder::new();
    content.reading_test(&[(Matching, 13), (TrueFalse, 14)]);
    let store = content.build();
    let publisher = RecordingEventPublisher::new();
    let user_test = empty_user_test(&store, Skill::Reading);
    let service = assembler(&store, &publisher);
    let ctx = ServiceContext::generate();

    service
        .assemble_reading(&ctx, AssemblyRequest::new(user_test.id, vec![Matching]), &mut seeded_rng(3))
        .await
        .unwrap();
    let err = service
        .assemble_reading(&ctx, AssemblyRequest::new(user_test.id, vec![TrueFalse]), &mut seeded_rng(3))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Assembly(AssemblyError::AlreadyAssembled(id)) if id == user_test.id
    ));
    assert_eq!(store.user_test_detail_count(), 1);
}

#[tokio::test]
async fn test_assemble_unknown_user_test() {
    let store = ContentBuilder::new().build();
    let publisher = RecordingEventPublisher::new();
    let missing = UserTestBuilder::new(AccountId::new()).build();

    let err = assembler(&store, &publisher)
        .assemble_listening(
            &ServiceContext::generate(),
            AssemblyRequest::new(missing.id, vec![Matching]),
            &mut seeded_rng(1),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_assemble_listening_binds_whole_sound() {
    // Arrange: only the second sound has two completion lists
    let mut content = ContentBuilder::new();
    content.listening_test(&[(Complete, 10), (Matching, 10), (MultipleChoice, 10), (Diagram, 10)]);
    let (_, wanted) =
        content.listening_test(&[(Complete, 10), (Complete, 10), (Matching, 10), (TrueFalse, 10)]);
    let store = content.build();
    let publisher = RecordingEventPublisher::new();
    let user_test = empty_user_test(&store, Skill::Listening);

    // Act
    let outcome = assembler(&store, &publisher)
        .assemble_listening(
            &ServiceContext::generate(),
            AssemblyRequest::new(user_test.id, vec![Complete, Complete]),
            &mut seeded_rng(11),
        )
        .await
        .unwrap();

    // Assert: every section of the sound is assigned, in recording order
    assert_eq!(outcome.sound_id, Some(wanted));
    assert_eq!(outcome.details.len(), 4);
    assert_eq!(store.user_test_detail_count(), 4);
}

#[tokio::test]
async fn test_assemble_listening_without_match() {
    let mut content = ContentBuilder::new();
    content.listening_test(&[(Complete, 10), (Matching, 10), (Diagram, 10), (TrueFalse, 10)]);
    let store = content.build();
    let publisher = RecordingEventPublisher::new();
    let user_test = empty_user_test(&store, Skill::Listening);

    let err = assembler(&store, &publisher)
        .assemble_listening(
            &ServiceContext::generate(),
            AssemblyRequest::new(user_test.id, vec![Matching, Matching]),
            &mut seeded_rng(5),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Assembly(AssemblyError::NoMatchingSections {
            skill: Skill::Listening,
            ..
        })
    ));
}
