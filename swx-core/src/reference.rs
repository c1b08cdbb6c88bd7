//! Sequential reference recurrence
//!
//! This is the specification oracle: the single-threaded
//! Smith-Waterman recurrence with two rolling rows. Both parallel
//! schedulers must reproduce its score and checksum exactly.

use crate::checksum::CellDigest;
use crate::error::{ScoreError, ScoreResult};
use crate::report::ScoreReport;
use crate::scoring::ScoringScheme;

/// Reject empty inputs before any allocation
pub(crate) fn validate_pair(seq1: &[u8], seq2: &[u8]) -> ScoreResult<()> {
    if seq1.is_empty() || seq2.is_empty() {
        return Err(ScoreError::invalid_argument(
            "sequences must not be empty",
        ));
    }
    Ok(())
}

/// Allocate a zeroed DP buffer, reporting allocation failure as
/// resource exhaustion instead of aborting
pub(crate) fn alloc_cells(len: usize) -> ScoreResult<Vec<i64>> {
    let mut cells = Vec::new();
    cells.try_reserve_exact(len).map_err(|_| {
        ScoreError::resource(format!("cannot allocate DP buffer of {} cells", len))
    })?;
    cells.resize(len, 0);
    Ok(cells)
}

/// Score a pair of sequences with the sequential recurrence
///
/// Row 0 and column 0 are fixed at zero (local alignment boundary);
/// every interior cell is the max of zero and its three dependency
/// moves. Only two rows are retained at any time.
pub fn score_reference(
    seq1: &[u8],
    seq2: &[u8],
    scoring: &ScoringScheme,
) -> ScoreResult<ScoreReport> {
    validate_pair(seq1, seq2)?;

    let len1 = seq1.len();
    let len2 = seq2.len();
    let mut prev = alloc_cells(len2 + 1)?;
    let mut curr = alloc_cells(len2 + 1)?;

    let mut max_score = 0i64;
    let mut digest = CellDigest::new();

    for i in 1..=len1 {
        curr[0] = 0;
        for j in 1..=len2 {
            let diagonal = prev[j - 1] + scoring.substitution(seq1[i - 1], seq2[j - 1]);
            let delete = prev[j] + scoring.gap();
            let insert = curr[j - 1] + scoring.gap();
            let cell = 0i64.max(diagonal).max(delete).max(insert);

            curr[j] = cell;
            digest.record(i, j, cell);
            if cell > max_score {
                max_score = cell;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    Ok(ScoreReport {
        score: max_score,
        checksum: digest.value(),
        cells: len1 as u64 * len2 as u64,
    })
}
