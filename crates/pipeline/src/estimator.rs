//! Local gas cost estimation.

/// Pure cost model over a compressed payload.
///
/// Produces the scheduling metric used by the batch queue's gas-ceiling
/// trigger. It is a function of the encoded string's length only and is never
/// asserted to match real network cost.
#[derive(Clone, Copy, Debug)]
pub struct GasEstimator {
    /// Fixed cost per dispatch.
    pub base_cost: u64,
    /// Cost per byte of encoded payload.
    pub cost_per_byte: u64,
    /// Fixed per-event bookkeeping overhead.
    pub event_overhead: u64,
}

impl Default for GasEstimator {
    fn default() -> Self {
        Self { base_cost: 21_000, cost_per_byte: 16, event_overhead: 5_000 }
    }
}

impl GasEstimator {
    /// Estimate the cost of dispatching one compressed payload.
    pub const fn estimate(&self, encoded: &str) -> u64 {
        self.base_cost + self.cost_per_byte * encoded.len() as u64 + self.event_overhead
    }
}
