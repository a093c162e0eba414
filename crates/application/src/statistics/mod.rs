//! Statistics over result history
//!
//! Counts, time totals, average bands and band histograms, optionally
//! restricted to a week of month, a month or a year. The reference instant is
//! always passed in by the caller.

mod aggregator;
mod window;

pub use aggregator::*;
pub use window::*;
