//! IELTS band scores.
//!
//! A band is a half-point value between 1.0 and 9.0. Bands are derived from the
//! raw number of correct answers (0..=40) through a fixed step table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper raw-score bound (inclusive) for each band, in half-band units.
/// Scores above the last bound map to 9.0.
const BAND_TABLE: [(u32, u8); 14] = [
    (1, 2),
    (3, 4),
    (5, 6),
    (7, 7),
    (9, 8),
    (12, 9),
    (15, 10),
    (19, 11),
    (22, 12),
    (26, 13),
    (29, 14),
    (32, 15),
    (34, 16),
    (36, 17),
];

const MIN_HALVES: u8 = 2;
const MAX_HALVES: u8 = 18;

/// Band score on the 1.0..=9.0 half-point scale
///
/// Stored as a count of half bands so that equality and ordering are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct BandScore(u8);

impl BandScore {
    /// Lowest band
    pub const MIN: BandScore = BandScore(MIN_HALVES);
    /// Highest band
    pub const MAX: BandScore = BandScore(MAX_HALVES);

    /// Convert a raw correct-answer count to its band.
    ///
    /// Total over all inputs: anything above the table clamps to 9.0.
    pub fn from_raw_score(raw: u32) -> Self {
        BAND_TABLE
            .iter()
            .find(|(upper, _)| raw <= *upper)
            .map(|(_, halves)| BandScore(*halves))
            .unwrap_or(Self::MAX)
    }

    /// Build a band from a decimal value; must be a half step within 1.0..=9.0
    pub fn from_value(value: f64) -> Option<Self> {
        let halves = value * 2.0;
        if halves.fract() != 0.0 {
            return None;
        }
        let halves = halves as i64;
        if halves < MIN_HALVES as i64 || halves > MAX_HALVES as i64 {
            return None;
        }
        Some(BandScore(halves as u8))
    }

    /// Every band from 1.0 to 9.0 in 0.5 steps, ascending
    pub fn all() -> impl Iterator<Item = BandScore> {
        (MIN_HALVES..=MAX_HALVES).map(BandScore)
    }

    pub fn value(&self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl From<BandScore> for f64 {
    fn from(band: BandScore) -> Self {
        band.value()
    }
}

impl TryFrom<f64> for BandScore {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        BandScore::from_value(value).ok_or_else(|| format!("invalid band score {}", value))
    }
}

impl fmt::Display for BandScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}
