//! Result reporting and engine dispatch

use crate::error::{ScoreError, ScoreResult};
use crate::scoring::ScoringScheme;
use crate::{reference, tiled, wavefront};
use serde::Serialize;
use std::fmt;

/// Output of one scoring run, independent of how it was decomposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    /// Maximum local alignment score (non-negative)
    pub score: i64,
    /// Order-independent verification token over all computed cells
    pub checksum: u64,
    /// Number of DP cells computed
    pub cells: u64,
}

/// Which scoring engine to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Engine {
    /// Sequential oracle recurrence
    Reference,
    /// Anti-diagonal wavefront decomposition (rayon chunks + barrier)
    Wavefront,
    /// Tile pipeline with a dependency-counted ready queue
    Tiled { tile_size: usize },
}

impl Engine {
    pub fn name(&self) -> &'static str {
        match self {
            Engine::Reference => "reference",
            Engine::Wavefront => "wavefront",
            Engine::Tiled { .. } => "tiled",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Score a sequence pair with the chosen engine and worker count
///
/// The returned score and checksum are invariant over `threads` and
/// over the engine choice; only wall-clock time differs.
pub fn score_pair(
    seq1: &[u8],
    seq2: &[u8],
    scoring: &ScoringScheme,
    engine: Engine,
    threads: usize,
) -> ScoreResult<ScoreReport> {
    if threads == 0 {
        return Err(ScoreError::invalid_argument(
            "thread count must be positive",
        ));
    }
    match engine {
        Engine::Reference => reference::score_reference(seq1, seq2, scoring),
        Engine::Wavefront => wavefront::score_wavefront(seq1, seq2, scoring, threads),
        Engine::Tiled { tile_size } => {
            tiled::score_tiled(seq1, seq2, scoring, threads, tile_size)
        }
    }
}

/// Full record of one benchmark invocation
///
/// Sequence generation is excluded from `elapsed_secs`; the timer
/// covers the scoring phase only.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub length1: usize,
    pub length2: usize,
    pub threads: usize,
    pub engine: Engine,
    pub score: i64,
    pub checksum: u64,
    pub cells: u64,
    pub elapsed_secs: f64,
}

impl RunReport {
    pub fn new(
        length1: usize,
        length2: usize,
        threads: usize,
        engine: Engine,
        report: ScoreReport,
        elapsed_secs: f64,
    ) -> Self {
        Self {
            length1,
            length2,
            threads,
            engine,
            score: report.score,
            checksum: report.checksum,
            cells: report.cells,
            elapsed_secs,
        }
    }

    /// The line-oriented stdout contract consumed by the benchmark harness
    pub fn harness_lines(&self) -> String {
        format!(
            "Sequence length: {}\n\
             Smith-Waterman score: {}\n\
             Execution time: {:.6} seconds\n\
             checksum={:016x}\n",
            self.length1, self.score, self.elapsed_secs, self.checksum
        )
    }
}
