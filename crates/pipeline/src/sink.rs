//! Event sink trait and error types.

use async_trait::async_trait;
use rush_primitives::{Address, EventBatch, EventKind, SubmissionReceipt};

/// Sink errors. All variants originate on the collaborator side; the pipeline
/// never interprets them beyond retry classification.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SinkError {
    /// RPC connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),
    /// Call reached the collaborator and was rejected.
    #[error("Call rejected: {0}")]
    Rejected(String),
    /// Timeout waiting for the call to resolve.
    #[error("Timeout waiting for call to resolve")]
    Timeout,
}

/// Async boundary to the on-chain collaborator.
///
/// These are the pipeline's only two suspension points. Both calls are opaque:
/// the pipeline observes success or failure and nothing else.
///
/// Implementations:
/// - a contract-backed sink in the host application
/// - recording/failing mocks in tests
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Submit a grouped batch of events as one contract call.
    async fn submit_batch(&mut self, batch: EventBatch) -> Result<SubmissionReceipt, SinkError>;

    /// Submit a single urgent event, bypassing batching.
    async fn submit_single(
        &mut self,
        kind: EventKind,
        actor: Address,
        timestamp: u64,
        correlation_id: &str,
        payload: &str,
    ) -> Result<SubmissionReceipt, SinkError>;
}
