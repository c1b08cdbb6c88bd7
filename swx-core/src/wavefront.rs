//! Anti-diagonal wavefront scheduler
//!
//! Cells sharing `i + j = k` form a wavefront and are mutually
//! independent; a front depends only on the two preceding fronts, so
//! three rolling diagonal buffers are the whole retained DP state.
//! Each front is split into at most T contiguous chunks computed on a
//! fixed-size rayon pool, and the per-front parallel iterator doubles
//! as the barrier between fronts. Chunk results are reduced with
//! pairwise max and digest merge, both associative and commutative, so
//! the score and checksum are identical for every thread count.

use crate::checksum::CellDigest;
use crate::error::{ScoreError, ScoreResult};
use crate::reference::{alloc_cells, score_reference, validate_pair};
use crate::report::ScoreReport;
use crate::scoring::ScoringScheme;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// First row index of wavefront `k`
#[inline]
fn front_lo(k: usize, len2: usize) -> usize {
    k.saturating_sub(len2).max(1)
}

/// Last row index of wavefront `k`
#[inline]
fn front_hi(k: usize, len1: usize) -> usize {
    len1.min(k - 1)
}

/// Score a pair of sequences with the wavefront decomposition
///
/// `threads == 1` delegates to the sequential reference engine so the
/// single-worker baseline keeps the exact reference accumulation
/// order. A worker panic aborts the run and surfaces as one
/// `ComputationFailure`.
pub fn score_wavefront(
    seq1: &[u8],
    seq2: &[u8],
    scoring: &ScoringScheme,
    threads: usize,
) -> ScoreResult<ScoreReport> {
    validate_pair(seq1, seq2)?;
    if threads == 0 {
        return Err(ScoreError::invalid_argument(
            "thread count must be positive",
        ));
    }
    if threads == 1 {
        return score_reference(seq1, seq2, scoring);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("swx-wavefront-{}", idx))
        .build()
        .map_err(|e| ScoreError::computation(format!("cannot build worker pool: {}", e)))?;

    log::debug!(
        "wavefront scoring {}x{} cells with {} workers",
        seq1.len(),
        seq2.len(),
        threads
    );

    catch_unwind(AssertUnwindSafe(|| {
        run_wavefronts(seq1, seq2, scoring, threads, &pool)
    }))
    .unwrap_or_else(|_| Err(ScoreError::computation("worker panicked during scoring")))
}

fn run_wavefronts(
    seq1: &[u8],
    seq2: &[u8],
    scoring: &ScoringScheme,
    threads: usize,
    pool: &rayon::ThreadPool,
) -> ScoreResult<ScoreReport> {
    let len1 = seq1.len();
    let len2 = seq2.len();
    let max_width = len1.min(len2);

    // prev2 holds front k-2, prev1 front k-1, curr is being written.
    let mut prev2 = alloc_cells(max_width)?;
    let mut prev1 = alloc_cells(max_width)?;
    let mut curr = alloc_cells(max_width)?;
    let mut lo_prev1 = 0usize;
    let mut lo_prev2 = 0usize;

    let mut max_score = 0i64;
    let mut digest = CellDigest::new();
    let gap = scoring.gap();

    for k in 2..=(len1 + len2) {
        let lo = front_lo(k, len2);
        let hi = front_hi(k, len1);
        let width = hi - lo + 1;
        let chunk = (width + threads - 1) / threads;

        let front = &mut curr[..width];
        let up_left = &prev1[..];
        let diag = &prev2[..];

        let (front_max, front_digest) = pool.install(|| {
            front
                .par_chunks_mut(chunk)
                .enumerate()
                .map(|(c, cells)| {
                    let base = lo + c * chunk;
                    let mut local_max = 0i64;
                    let mut local_digest = CellDigest::new();
                    for (off, cell) in cells.iter_mut().enumerate() {
                        let i = base + off;
                        let j = k - i;
                        // Out-of-front dependencies are row 0 / column 0,
                        // which are fixed at zero.
                        let dep_diag = if i > 1 && j > 1 {
                            diag[(i - 1) - lo_prev2]
                        } else {
                            0
                        };
                        let dep_up = if i > 1 { up_left[(i - 1) - lo_prev1] } else { 0 };
                        let dep_left = if j > 1 { up_left[i - lo_prev1] } else { 0 };

                        let value = 0i64
                            .max(dep_diag + scoring.substitution(seq1[i - 1], seq2[j - 1]))
                            .max(dep_up + gap)
                            .max(dep_left + gap);
                        *cell = value;
                        local_digest.record(i, j, value);
                        if value > local_max {
                            local_max = value;
                        }
                    }
                    (local_max, local_digest)
                })
                .reduce(
                    || (0i64, CellDigest::new()),
                    |(max_a, mut dig_a), (max_b, dig_b)| {
                        dig_a.merge(dig_b);
                        (max_a.max(max_b), dig_a)
                    },
                )
        });

        max_score = max_score.max(front_max);
        digest.merge(front_digest);

        // Rotate the rolling buffers: curr becomes prev1, prev1 becomes
        // prev2, and the old prev2 storage is reused for the next front.
        std::mem::swap(&mut prev2, &mut prev1);
        std::mem::swap(&mut prev1, &mut curr);
        lo_prev2 = lo_prev1;
        lo_prev1 = lo;
    }

    Ok(ScoreReport {
        score: max_score,
        checksum: digest.value(),
        cells: len1 as u64 * len2 as u64,
    })
}
