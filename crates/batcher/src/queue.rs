//! Priority-ordered batch queue and flush triggers.

use std::collections::VecDeque;

use rush_primitives::CompressedEvent;
use tracing::trace;

use crate::BatcherConfig;

/// Why a flush was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushTrigger {
    /// Queue length reached the configured batch size.
    Size,
    /// Aggregate estimated cost reached the gas ceiling.
    GasCeiling,
    /// A high-priority item is queued alongside at least half a full batch.
    Priority,
    /// The idle flush timer expired.
    Timeout,
    /// Caller-requested flush.
    Manual,
}

/// Ordered buffer of compressed events awaiting dispatch.
///
/// Kept sorted by descending priority with stable insertion order among equal
/// priorities. The running cost total backs the gas-ceiling trigger without
/// rescanning the queue.
#[derive(Debug, Default)]
pub struct BatchQueue {
    items: VecDeque<CompressedEvent>,
    total_cost: u64,
}

impl BatchQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an event at its priority position.
    ///
    /// Equal priorities keep submission order (stable insert).
    pub fn insert(&mut self, event: CompressedEvent) {
        self.total_cost += event.estimated_cost;
        let position = self
            .items
            .iter()
            .position(|queued| queued.priority < event.priority)
            .unwrap_or(self.items.len());
        self.items.insert(position, event);

        trace!(len = self.items.len(), total_cost = self.total_cost, "Event queued");
    }

    /// Evaluates the flush triggers against the current queue contents.
    ///
    /// Checked after every insertion. Trigger precedence follows declaration
    /// order: size, gas ceiling, then priority.
    pub fn check_triggers(&self, config: &BatcherConfig) -> Option<FlushTrigger> {
        if self.items.len() >= config.batch_size {
            return Some(FlushTrigger::Size);
        }
        if self.total_cost >= config.max_gas_per_tx {
            return Some(FlushTrigger::GasCeiling);
        }
        let half_batch = config.batch_size.div_ceil(2);
        if self.items.len() >= half_batch
            && self.items.iter().any(|queued| queued.priority >= config.priority_threshold)
        {
            return Some(FlushTrigger::Priority);
        }
        None
    }

    /// Removes and returns the entire queue contents in priority order.
    pub fn drain(&mut self) -> Vec<CompressedEvent> {
        self.total_cost = 0;
        self.items.drain(..).collect()
    }

    /// Reinserts a failed slice at the front, preserving order and priorities.
    ///
    /// The only resurrection path: used when a batch dispatch fails so the
    /// slice leads the next flush.
    pub fn requeue_front(&mut self, slice: Vec<CompressedEvent>) {
        for event in slice.into_iter().rev() {
            self.total_cost += event.estimated_cost;
            self.items.push_front(event);
        }
    }

    /// Drops all queued items, returning how many were discarded.
    pub fn clear(&mut self) -> usize {
        self.total_cost = 0;
        let dropped = self.items.len();
        self.items.clear();
        dropped
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Aggregate estimated cost of all queued events.
    pub const fn total_cost(&self) -> u64 {
        self.total_cost
    }
}
