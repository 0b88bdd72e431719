//! Usage history and derived metrics.

use std::collections::VecDeque;

use rush_primitives::UsageRecord;

/// Default ring-buffer capacity.
pub const DEFAULT_HISTORY_CAP: usize = 100;

/// Assumed gas per event when every event ships as its own transaction.
///
/// The savings metric is measured against this fixed baseline; it is a local
/// comparison constant, not a chain measurement.
pub const BASELINE_COST_PER_ITEM: u64 = 65_000;

/// Records compared on each side when classifying the trend.
const TREND_WINDOW: usize = 5;

/// Relative deadband inside which the trend reads as stable.
const TREND_DEADBAND: f64 = 0.05;

/// Average-cost threshold above which larger batches are suggested.
const HIGH_AVG_COST: f64 = 40_000.0;

/// Savings threshold below which stronger compression is suggested.
const LOW_SAVINGS_PERCENT: f64 = 20.0;

/// Item-volume threshold for the dedicated-lane suggestion.
const HIGH_VOLUME_ITEMS: u64 = 500;

/// Average-cost threshold for the dedicated-lane suggestion.
const HIGH_VOLUME_AVG_COST: f64 = 30_000.0;

/// Direction of recent per-event cost relative to the preceding window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    /// Recent dispatches are cheaper per event.
    Improving,
    /// Within the deadband, or not enough history yet.
    Stable,
    /// Recent dispatches are dearer per event.
    Declining,
}

/// Ring-buffered history of dispatch outcomes with derived metrics.
///
/// Appending past capacity evicts the oldest record first; everything else is
/// a read-only computation over the retained window. No failure modes.
#[derive(Clone, Debug)]
pub struct UsageMonitor {
    history: VecDeque<UsageRecord>,
    capacity: usize,
}

impl Default for UsageMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl UsageMonitor {
    /// Create a monitor retaining at most `capacity` records.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "History capacity must be greater than zero");
        Self { history: VecDeque::with_capacity(capacity), capacity }
    }

    /// Append a dispatch outcome, evicting the oldest record when full.
    pub fn record(&mut self, record: UsageRecord) {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether any history has been recorded.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Maximum retained records.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &UsageRecord> {
        self.history.iter()
    }

    /// Total events across the retained history.
    pub fn total_items(&self) -> u64 {
        self.history.iter().map(|r| r.item_count as u64).sum()
    }

    /// Total estimated gas across the retained history.
    pub fn total_gas(&self) -> u64 {
        self.history.iter().map(|r| r.gas_used).sum()
    }

    /// Average estimated gas per event; `0.0` with no history.
    pub fn average_cost_per_item(&self) -> f64 {
        let items = self.total_items();
        if items == 0 {
            return 0.0;
        }
        self.total_gas() as f64 / items as f64
    }

    /// Savings versus [`BASELINE_COST_PER_ITEM`], as a percentage in `0..=100`.
    pub fn savings_percent(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let ratio = self.average_cost_per_item() / BASELINE_COST_PER_ITEM as f64;
        ((1.0 - ratio) * 100.0).max(0.0)
    }

    /// Classify the recent cost trend.
    ///
    /// Compares the mean per-event cost of the five most recent records
    /// against the five before them, with a ±5% deadband for
    /// [`Trend::Stable`]. Short histories read as stable.
    pub fn trend(&self) -> Trend {
        if self.history.len() < 2 * TREND_WINDOW {
            return Trend::Stable;
        }
        let split = self.history.len() - TREND_WINDOW;
        let recent = Self::mean_cost_per_item(self.history.iter().skip(split));
        let previous = Self::mean_cost_per_item(self.history.iter().skip(split - TREND_WINDOW).take(TREND_WINDOW));

        if previous == 0.0 {
            return Trend::Stable;
        }
        let change = (recent - previous) / previous;
        if change < -TREND_DEADBAND {
            Trend::Improving
        } else if change > TREND_DEADBAND {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }

    /// Human-readable tuning suggestions for the host UI.
    pub fn recommendations(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.is_empty() {
            return out;
        }

        let average = self.average_cost_per_item();
        if average > HIGH_AVG_COST {
            out.push(
                "Average gas per event is high; increase the batch size to amortize per-call overhead"
                    .to_string(),
            );
        }
        if self.savings_percent() < LOW_SAVINGS_PERCENT {
            out.push(
                "Savings over unbatched submission are low; switch to a stronger compression strategy"
                    .to_string(),
            );
        }
        if self.trend() == Trend::Declining {
            out.push(
                "Gas per event is trending up; investigate recent payload growth".to_string(),
            );
        }
        if self.total_items() > HIGH_VOLUME_ITEMS && average > HIGH_VOLUME_AVG_COST {
            out.push(
                "Sustained high volume at high per-event cost; consider a dedicated subnet lane for telemetry"
                    .to_string(),
            );
        }
        out
    }

    /// Snapshot of every derived metric, for UI consumption.
    pub fn summary(&self) -> UsageSummary {
        UsageSummary {
            record_count: self.len(),
            total_items: self.total_items(),
            total_gas: self.total_gas(),
            average_cost_per_item: self.average_cost_per_item(),
            savings_percent: self.savings_percent(),
            trend: self.trend(),
            recommendations: self.recommendations(),
        }
    }

    fn mean_cost_per_item<'a>(records: impl Iterator<Item = &'a UsageRecord>) -> f64 {
        let mut total_gas = 0u64;
        let mut total_items = 0u64;
        for record in records {
            total_gas += record.gas_used;
            total_items += record.item_count as u64;
        }
        if total_items == 0 {
            return 0.0;
        }
        total_gas as f64 / total_items as f64
    }
}

/// Point-in-time view of the monitor's derived metrics.
#[derive(Clone, Debug)]
pub struct UsageSummary {
    /// Records currently retained.
    pub record_count: usize,
    /// Total events across the retained history.
    pub total_items: u64,
    /// Total estimated gas across the retained history.
    pub total_gas: u64,
    /// Average estimated gas per event.
    pub average_cost_per_item: f64,
    /// Savings versus the unbatched baseline, percent.
    pub savings_percent: f64,
    /// Recent cost trend.
    pub trend: Trend,
    /// Tuning suggestions.
    pub recommendations: Vec<String>,
}
