//! Error handling for SWx scoring runs

use thiserror::Error;

/// Errors that can occur during a scoring run
///
/// A scoring run is one-shot and idempotent: every variant aborts the
/// whole computation with no partial results and no retries.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Computation failed: {0}")]
    ComputationFailure(String),

    #[error("Resource exhaustion: {0}")]
    ResourceExhaustion(String),
}

impl ScoreError {
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn computation<S: Into<String>>(message: S) -> Self {
        Self::ComputationFailure(message.into())
    }

    pub fn resource<S: Into<String>>(message: S) -> Self {
        Self::ResourceExhaustion(message.into())
    }
}

/// Result type for scoring operations
pub type ScoreResult<T> = Result<T, ScoreError>;
