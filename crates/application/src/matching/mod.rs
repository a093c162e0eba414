//! Section matching under a question-type mix
//!
//! Given a requested multiset of question list types, the matcher finds
//! content that covers it: distinct reading sections, one per requested type,
//! or a single listening sound whose lists cover the whole multiset. When more
//! than one candidate qualifies, one is picked uniformly with the caller's RNG.

mod listening;
mod reading;

pub use listening::{qualifying_sounds, sound_sections, sound_type_multisets};
pub use reading::{reading_assignments, reading_candidates};

use ielts_domain::{
    AssemblyError, ListeningSection, QuestionList, QuestionListType, SectionId, Skill, SoundId,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sound chosen for a listening test with the sections it contributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningAssignment {
    pub sound_id: SoundId,
    /// Sections of the sound ordered by recording position
    pub sections: Vec<SectionId>,
}

/// Stateless matcher over a snapshot of content
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeConstraintMatcher;

impl TypeConstraintMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Pick distinct reading sections, one per requested type in request order
    pub fn match_reading<R: Rng + ?Sized>(
        &self,
        types: &[QuestionListType],
        lists: &[QuestionList],
        rng: &mut R,
    ) -> Result<Vec<SectionId>, AssemblyError> {
        let assignments = reading_assignments(types, lists);
        debug!(
            requested = types.len(),
            assignments = assignments.len(),
            "Enumerated reading assignments"
        );

        assignments
            .choose(rng)
            .cloned()
            .ok_or_else(|| no_match(Skill::Reading, types))
    }

    /// Pick one sound whose lists cover the requested type multiset
    pub fn match_listening<R: Rng + ?Sized>(
        &self,
        types: &[QuestionListType],
        lists: &[QuestionList],
        sections: &[ListeningSection],
        rng: &mut R,
    ) -> Result<ListeningAssignment, AssemblyError> {
        let sounds = qualifying_sounds(types, lists, sections);
        debug!(
            requested = types.len(),
            qualifying = sounds.len(),
            "Found qualifying sounds"
        );

        let sound_id = *sounds
            .choose(rng)
            .ok_or_else(|| no_match(Skill::Listening, types))?;

        Ok(ListeningAssignment {
            sound_id,
            sections: sound_sections(sound_id, sections),
        })
    }
}

fn no_match(skill: Skill, types: &[QuestionListType]) -> AssemblyError {
    AssemblyError::NoMatchingSections {
        skill,
        types: types.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use ielts_domain::QuestionListId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use QuestionListType::*;

    fn reading_list(list_type: QuestionListType, section: SectionId) -> QuestionList {
        QuestionList {
            id: QuestionListId::new(),
            list_type,
            question_count: 13,
            content: None,
            reading_sections: vec![section],
            listening_sections: vec![],
        }
    }

    #[test]
    fn test_reading_match_respects_request_order() {
        let (s1, s2) = (SectionId::new(), SectionId::new());
        let lists = vec![reading_list(Matching, s1), reading_list(TrueFalse, s2)];
        let mut rng = StdRng::seed_from_u64(7);

        let chosen = TypeConstraintMatcher::new()
            .match_reading(&[TrueFalse, Matching], &lists, &mut rng)
            .unwrap();

        assert_eq!(chosen, vec![s2, s1]);
    }

    #[test]
    fn test_reading_no_match_reports_request() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = TypeConstraintMatcher::new()
            .match_reading(&[Diagram], &[], &mut rng)
            .unwrap_err();

        match err {
            AssemblyError::NoMatchingSections { skill, types } => {
                assert_eq!(skill, Skill::Reading);
                assert_eq!(types, vec![Diagram]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_same_seed_same_choice() {
        let sections: Vec<SectionId> = (0..6).map(|_| SectionId::new()).collect();
        let lists: Vec<QuestionList> = sections
            .iter()
            .map(|section| reading_list(Complete, *section))
            .collect();
        let matcher = TypeConstraintMatcher::new();

        let first = matcher
            .match_reading(&[Complete, Complete], &lists, &mut StdRng::seed_from_u64(99))
            .unwrap();
        let second = matcher
            .match_reading(&[Complete, Complete], &lists, &mut StdRng::seed_from_u64(99))
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_listening_returns_whole_sound() {
        let sound = SoundId::new();
        let sections: Vec<ListeningSection> = (1..=4)
            .map(|order| ListeningSection {
                id: SectionId::new(),
                sound_id: sound,
                order,
                time_offset: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
                transcript: None,
            })
            .collect();
        let lists = vec![QuestionList {
            id: QuestionListId::new(),
            list_type: MultipleChoice,
            question_count: 10,
            content: None,
            reading_sections: vec![],
            listening_sections: vec![sections[2].id],
        }];
        let mut rng = StdRng::seed_from_u64(1);

        let assignment = TypeConstraintMatcher::new()
            .match_listening(&[MultipleChoice], &lists, &sections, &mut rng)
            .unwrap();

        assert_eq!(assignment.sound_id, sound);
        assert_eq!(
            assignment.sections,
            sections.iter().map(|s| s.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_listening_no_match() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = TypeConstraintMatcher::new()
            .match_listening(&[Matching], &[], &[], &mut rng)
            .unwrap_err();

        assert!(matches!(
            err,
            AssemblyError::NoMatchingSections {
                skill: Skill::Listening,
                ..
            }
        ));
    }
}
