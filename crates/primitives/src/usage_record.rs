//! Usage record type.

/// One dispatch outcome, as recorded by the usage monitor.
///
/// Append-only: never mutated after it enters the history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsageRecord {
    /// Dispatch time (ms since epoch).
    pub timestamp: u64,
    /// Total estimated gas of the dispatched slice.
    pub gas_used: u64,
    /// Number of events in the slice.
    pub item_count: usize,
    /// Label of the compression strategy used for the flush.
    pub strategy: &'static str,
}
