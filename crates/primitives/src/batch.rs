//! Parallel-array batch payload for grouped contract calls.

use alloy_primitives::Address;

use crate::CompressedEvent;

/// Payload of a single grouped call to the on-chain collaborator.
///
/// All arrays are parallel and equal in length; index `i` across every array
/// describes one event. Built from a flushed queue slice in priority order.
#[derive(Clone, Debug, Default)]
pub struct EventBatch {
    /// Wire values of each event's [`EventKind`](crate::EventKind).
    pub kinds: Vec<u8>,
    /// Originating wallets.
    pub actors: Vec<Address>,
    /// Submission timestamps (ms since epoch).
    pub timestamps: Vec<u64>,
    /// Caller-supplied session/grouping ids.
    pub correlation_ids: Vec<String>,
    /// Compressed attribute payloads.
    pub payloads: Vec<String>,
}

impl EventBatch {
    /// Build a batch payload from an ordered slice of compressed events.
    pub fn from_events(events: &[CompressedEvent]) -> Self {
        let mut batch = Self {
            kinds: Vec::with_capacity(events.len()),
            actors: Vec::with_capacity(events.len()),
            timestamps: Vec::with_capacity(events.len()),
            correlation_ids: Vec::with_capacity(events.len()),
            payloads: Vec::with_capacity(events.len()),
        };
        for event in events {
            batch.kinds.push(event.kind.wire());
            batch.actors.push(event.actor);
            batch.timestamps.push(event.occurred_at);
            batch.correlation_ids.push(event.correlation_id.clone());
            batch.payloads.push(event.encoded.clone());
        }
        batch
    }

    /// Number of events in the batch.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the batch holds no events.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
