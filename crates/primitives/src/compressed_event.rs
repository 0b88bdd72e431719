//! Compressed event type.

use alloy_primitives::Address;

use crate::EventKind;

/// A semantic event after compression and cost estimation.
///
/// Owned by the pipeline from creation until dispatch. Derivation from the
/// originating [`SemanticEvent`](crate::SemanticEvent) is idempotent, so a
/// failed dispatch can safely requeue the same value.
#[derive(Clone, Debug)]
pub struct CompressedEvent {
    /// Event category.
    pub kind: EventKind,
    /// Originating wallet.
    pub actor: Address,
    /// Milliseconds since epoch, carried from the source event.
    pub occurred_at: u64,
    /// Caller-supplied session/grouping id.
    pub correlation_id: String,
    /// Urgency carried from the source event. Never recomputed.
    pub priority: u8,
    /// Compressed attribute payload.
    pub encoded: String,
    /// Label of the strategy that produced `encoded`.
    pub strategy_label: &'static str,
    /// Local scheduling cost; never asserted against real chain cost.
    pub estimated_cost: u64,
}
