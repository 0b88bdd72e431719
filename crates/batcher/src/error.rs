//! Batcher error types.

use rush_pipeline::SinkError;
use thiserror::Error;

/// Batcher errors.
///
/// Batch-path dispatch failures never appear here: they are recovered by
/// requeueing and reported through [`FlushOutcome`](crate::FlushOutcome).
#[derive(Debug, Clone, Error)]
pub enum BatcherError {
    /// Batch size must be at least one.
    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(usize),

    /// Batch timeout must be nonzero.
    #[error("Invalid batch timeout: must be nonzero")]
    InvalidTimeout,

    /// Gas ceiling must be nonzero.
    #[error("Invalid gas ceiling: {0}")]
    InvalidGasCeiling(u64),

    /// Single-attempt immediate dispatch failed.
    #[error("Immediate dispatch failed: {0}")]
    ImmediateDispatch(#[from] SinkError),
}

impl BatcherError {
    /// Whether the error was raised at construction time.
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidBatchSize(_) | Self::InvalidTimeout | Self::InvalidGasCeiling(_)
        )
    }
}
