//! SWx Core Library
//!
//! Sequence generation, local alignment scoring, and the parallel
//! wavefront/tiled schedulers for SWx.
//!
//! The reference engine in [`reference`] is the correctness oracle:
//! both parallel engines must return the exact same score and checksum
//! as the sequential recurrence for every thread count.

pub mod checksum;
pub mod error;
pub mod reference;
pub mod report;
pub mod scoring;
pub mod sequence;
pub mod tiled;
pub mod wavefront;

// Re-export commonly used types and functions
pub use checksum::CellDigest;
pub use error::{ScoreError, ScoreResult};
pub use report::{score_pair, Engine, RunReport, ScoreReport};
pub use scoring::ScoringScheme;
pub use sequence::SequenceGenerator;

/// Version information for the SWx core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
