//! Proptest strategies for domain values.

use ielts_domain::QuestionListType;
use proptest::prelude::*;
use proptest::sample::select;

pub fn arb_question_list_type() -> impl Strategy<Value = QuestionListType> {
    select(QuestionListType::ALL.to_vec())
}

/// Assembly type requests of one to four types, repeats allowed
pub fn arb_type_request() -> impl Strategy<Value = Vec<QuestionListType>> {
    proptest::collection::vec(arb_question_list_type(), 1..=4)
}
