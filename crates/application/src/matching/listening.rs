//! Listening sound selection.
//!
//! A listening test is assembled from one whole sound. A sound qualifies when
//! the multiset of list types attached to its sections contains the requested
//! multiset.

use ielts_domain::{ListeningSection, QuestionList, QuestionListType, SectionId, SoundId};
use std::collections::{BTreeMap, HashMap};

/// List types available under each sound, restricted to the requested types.
///
/// Lists whose section belongs to no known sound are skipped.
pub fn sound_type_multisets(
    types: &[QuestionListType],
    lists: &[QuestionList],
    sections: &[ListeningSection],
) -> BTreeMap<SoundId, Vec<QuestionListType>> {
    let owner: HashMap<SectionId, SoundId> = sections
        .iter()
        .map(|section| (section.id, section.sound_id))
        .collect();

    let mut available: BTreeMap<SoundId, Vec<QuestionListType>> = BTreeMap::new();
    for list in lists.iter().filter(|list| types.contains(&list.list_type)) {
        let Some(sound_id) = list
            .listening_section()
            .and_then(|section| owner.get(&section))
        else {
            continue;
        };
        available.entry(*sound_id).or_default().push(list.list_type);
    }

    available
}

/// Sounds whose available types cover the requested multiset, in id order
pub fn qualifying_sounds(
    types: &[QuestionListType],
    lists: &[QuestionList],
    sections: &[ListeningSection],
) -> Vec<SoundId> {
    let required = multiplicities(types);

    sound_type_multisets(types, lists, sections)
        .into_iter()
        .filter(|(_, available)| contains_multiset(&multiplicities(available), &required))
        .map(|(sound_id, _)| sound_id)
        .collect()
}

/// Sections of a sound, ordered by their position in the recording
pub fn sound_sections(sound_id: SoundId, sections: &[ListeningSection]) -> Vec<SectionId> {
    let mut owned: Vec<&ListeningSection> = sections
        .iter()
        .filter(|section| section.sound_id == sound_id)
        .collect();
    owned.sort_by_key(|section| section.order);
    owned.into_iter().map(|section| section.id).collect()
}

fn multiplicities(types: &[QuestionListType]) -> HashMap<QuestionListType, usize> {
    let mut counts = HashMap::new();
    for list_type in types {
        *counts.entry(*list_type).or_insert(0) += 1;
    }
    counts
}

fn contains_multiset(
    available: &HashMap<QuestionListType, usize>,
    required: &HashMap<QuestionListType, usize>,
) -> bool {
    required
        .iter()
        .all(|(list_type, needed)| available.get(list_type).copied().unwrap_or(0) >= *needed)
}
