//! Reading section selection.
//!
//! Each requested type needs its own reading section carrying a question list
//! of that type. The search enumerates every assignment of distinct sections
//! to requested types, in request order.

use ielts_domain::{QuestionList, QuestionListType, SectionId};
use std::collections::HashMap;

/// Reading sections that carry at least one list of each requested type.
///
/// A section appears once per type even if several of its lists share that
/// type, so it is not favoured by the uniform pick.
pub fn reading_candidates(
    types: &[QuestionListType],
    lists: &[QuestionList],
) -> HashMap<QuestionListType, Vec<SectionId>> {
    let mut candidates: HashMap<QuestionListType, Vec<SectionId>> =
        types.iter().map(|list_type| (*list_type, Vec::new())).collect();

    for list in lists {
        let (Some(sections), Some(section)) =
            (candidates.get_mut(&list.list_type), list.reading_section())
        else {
            continue;
        };
        if !sections.contains(&section) {
            sections.push(section);
        }
    }

    candidates
}

/// Every assignment of pairwise distinct sections to `types`.
///
/// Position `i` of each assignment holds the section chosen for `types[i]`.
/// An empty request has exactly one assignment, the empty one.
pub fn reading_assignments(
    types: &[QuestionListType],
    lists: &[QuestionList],
) -> Vec<Vec<SectionId>> {
    let candidates = reading_candidates(types, lists);
    extend(types, &candidates, Vec::new())
}

fn extend(
    remaining: &[QuestionListType],
    candidates: &HashMap<QuestionListType, Vec<SectionId>>,
    chosen: Vec<SectionId>,
) -> Vec<Vec<SectionId>> {
    let Some((current, rest)) = remaining.split_first() else {
        return vec![chosen];
    };

    candidates
        .get(current)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter(|section| !chosen.contains(section))
        .flat_map(|section| {
            let mut next = chosen.clone();
            next.push(*section);
            extend(rest, candidates, next)
        })
        .collect()
}
