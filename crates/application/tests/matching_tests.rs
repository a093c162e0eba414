//! Property tests for the type constraint matcher

use ielts_application::matching::{qualifying_sounds, TypeConstraintMatcher};
use ielts_domain::{QuestionList, QuestionListType, SectionId, Skill, SoundId};
use ielts_testing::strategies::{arb_question_list_type, arb_type_request};
use ielts_testing::{create_test_listening_section, create_test_question_list, seeded_rng};
use proptest::prelude::*;
use std::collections::HashSet;

/// One reading section per entry, each with a single list of that type
fn reading_lists(types: &[QuestionListType]) -> Vec<QuestionList> {
    types
        .iter()
        .map(|list_type| create_test_question_list(*list_type, 13, Skill::Reading, SectionId::new()))
        .collect()
}

fn occurrences(types: &[QuestionListType], wanted: QuestionListType) -> usize {
    types.iter().filter(|t| **t == wanted).count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_reading_match_is_distinct_and_typed(
        available in proptest::collection::vec(arb_question_list_type(), 0..8),
        request in arb_type_request(),
        seed in any::<u64>(),
    ) {
        let lists = reading_lists(&available);
        let outcome = TypeConstraintMatcher::new()
            .match_reading(&request, &lists, &mut seeded_rng(seed));

        // With one list per section a match exists exactly when every type
        // is available at least as often as it is requested
        let satisfiable = QuestionListType::ALL
            .iter()
            .all(|t| occurrences(&request, *t) <= occurrences(&available, *t));

        match outcome {
            Ok(sections) => {
                prop_assert!(satisfiable);
                prop_assert_eq!(sections.len(), request.len());
                prop_assert_eq!(sections.iter().collect::<HashSet<_>>().len(), sections.len());
                for (section, wanted) in sections.iter().zip(&request) {
                    let list = lists
                        .iter()
                        .find(|list| list.reading_section() == Some(*section))
                        .unwrap();
                    prop_assert_eq!(list.list_type, *wanted);
                }
            }
            Err(_) => prop_assert!(!satisfiable),
        }
    }

    #[test]
    fn prop_listening_ignores_request_order(
        sounds in proptest::collection::vec(
            proptest::collection::vec(arb_question_list_type(), 1..=4),
            1..5,
        ),
        request in arb_type_request(),
    ) {
        let mut lists = Vec::new();
        let mut sections = Vec::new();
        for types in &sounds {
            let sound_id = SoundId::new();
            for (order, list_type) in (1u32..).zip(types) {
                let section = create_test_listening_section(sound_id, order);
                lists.push(create_test_question_list(*list_type, 10, Skill::Listening, section.id));
                sections.push(section);
            }
        }

        let mut reversed = request.clone();
        reversed.reverse();

        prop_assert_eq!(
            qualifying_sounds(&request, &lists, &sections),
            qualifying_sounds(&reversed, &lists, &sections)
        );
    }
}
