//! Test fixtures for generating domain entities with realistic data.
//!
//! This module provides functions to create test instances of all domain types
//! with sensible defaults and randomized text.

use chrono::{DateTime, NaiveTime, Utc};
use fake::{
    faker::lorem::en::{Paragraph, Sentence, Word},
    Fake,
};
use ielts_domain::{
    AccountId, Explanation, ExplanationId, ListeningSection, Question, QuestionId, QuestionList,
    QuestionListId, QuestionListType, ReadingSection, ResultId, SectionId, Skill, Sound, SoundId,
    Test, TestId, TestReference, TestResult, TestType, UserTest, UserTestId,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// Deterministic RNG for reproducible section selection
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Create a public test of the given skill
pub fn create_test_test(skill: Skill) -> Test {
    Test {
        id: TestId::new(),
        skill,
        test_type: TestType::Academic,
        name: format!("Cambridge {} Test {}", (10..20).fake::<u32>(), (1..5).fake::<u32>()),
        month_edition: (1..=12).fake(),
        year_edition: (2018..=2025).fake(),
        completed_count: 0,
    }
}

/// Create an empty user test owned by `account_id`
pub fn create_test_user_test(account_id: AccountId, skill: Skill) -> UserTest {
    UserTest {
        id: UserTestId::new(),
        account_id,
        name: Sentence(2..4).fake(),
        test_type: TestType::General,
        skill,
        created_at: Utc::now(),
    }
}

/// Create a reading section belonging to `test_id`
pub fn create_test_reading_section(test_id: TestId) -> ReadingSection {
    ReadingSection {
        id: SectionId::new(),
        test_id,
        title: Sentence(3..6).fake(),
        content: Paragraph(3..5).fake(),
        image: None,
    }
}

/// Create a sound belonging to `test_id`
pub fn create_test_sound(test_id: TestId) -> Sound {
    Sound {
        id: SoundId::new(),
        test_id,
        audio: format!("{}.mp3", Word().fake::<String>()),
    }
}

/// Create the listening section at position `order` of a sound
pub fn create_test_listening_section(sound_id: SoundId, order: u32) -> ListeningSection {
    ListeningSection {
        id: SectionId::new(),
        sound_id,
        order,
        time_offset: NaiveTime::from_hms_opt(0, (order.saturating_sub(1) * 8) % 60, 0)
            .unwrap_or_default(),
        transcript: Some(Paragraph(2..4).fake()),
    }
}

/// Create a question list attached to one section of the given skill
pub fn create_test_question_list(
    list_type: QuestionListType,
    question_count: u32,
    skill: Skill,
    section_id: SectionId,
) -> QuestionList {
    let (reading_sections, listening_sections) = match skill {
        Skill::Reading => (vec![section_id], vec![]),
        Skill::Listening => (vec![], vec![section_id]),
    };

    QuestionList {
        id: QuestionListId::new(),
        list_type,
        question_count,
        content: Some(Sentence(4..8).fake()),
        reading_sections,
        listening_sections,
    }
}

/// Create a question with the given reference answer
pub fn create_test_question(question_list_id: QuestionListId, answer: &str) -> Question {
    Question {
        id: QuestionId::new(),
        question_list_id,
        content: Some(Sentence(5..10).fake()),
        choices: None,
        answer: answer.to_string(),
    }
}

/// Create an explanation whose text is the reference answer
pub fn create_test_explanation(question_id: QuestionId, content: &str) -> Explanation {
    Explanation {
        id: ExplanationId::new(),
        question_id,
        content: content.to_string(),
    }
}

/// Create a result with a fixed score and creation time
pub fn create_test_result(
    account_id: AccountId,
    test: TestReference,
    score: u32,
    created_at: DateTime<Utc>,
) -> TestResult {
    TestResult {
        id: ResultId::new(),
        account_id,
        test,
        score,
        complete_time: Duration::from_secs((20..=40).fake::<u64>() * 60),
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_list_attaches_to_one_skill() {
        let section = SectionId::new();
        let list = create_test_question_list(QuestionListType::Matching, 13, Skill::Reading, section);

        assert_eq!(list.reading_section(), Some(section));
        assert_eq!(list.listening_section(), None);
    }

    #[test]
    fn test_listening_section_offsets_follow_order() {
        let sound = SoundId::new();
        let first = create_test_listening_section(sound, 1);
        let second = create_test_listening_section(sound, 2);

        assert!(first.time_offset < second.time_offset);
    }
}
