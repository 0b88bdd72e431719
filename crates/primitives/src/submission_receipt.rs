//! Submission receipt type.

use alloy_primitives::B256;

/// Result of a successful submission to the on-chain collaborator.
///
/// The pipeline treats this as an opaque success token; it never interprets
/// the hash beyond surfacing it to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Transaction hash reported by the collaborator.
    pub tx_hash: B256,
}
