//! Scoring parameters for local alignment

use serde::{Deserialize, Serialize};

/// Scoring scheme for the Smith-Waterman recurrence
///
/// Three integers, constant for a run and shared read-only across all
/// workers. Penalties are negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringScheme {
    /// Score for a match
    pub match_score: i32,
    /// Penalty for a mismatch
    pub mismatch_penalty: i32,
    /// Penalty for a gap (linear)
    pub gap_penalty: i32,
}

impl Default for ScoringScheme {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_penalty: -1,
            gap_penalty: -2,
        }
    }
}

impl ScoringScheme {
    pub fn new(match_score: i32, mismatch_penalty: i32, gap_penalty: i32) -> Self {
        Self {
            match_score,
            mismatch_penalty,
            gap_penalty,
        }
    }

    /// Substitution score for a pair of symbols
    #[inline]
    pub fn substitution(&self, a: u8, b: u8) -> i64 {
        if a == b {
            self.match_score as i64
        } else {
            self.mismatch_penalty as i64
        }
    }

    /// Gap penalty widened to the cell score type
    #[inline]
    pub fn gap(&self) -> i64 {
        self.gap_penalty as i64
    }
}
