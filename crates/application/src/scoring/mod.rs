//! Scoring module - Answer evaluation and result scoring
//!
//! This module compares submitted answers with reference answers taken either
//! from question explanations or from the question's own answer field, and
//! stores the per-question outcomes.

mod engine;
mod evaluators;

pub use engine::*;
pub use evaluators::*;
