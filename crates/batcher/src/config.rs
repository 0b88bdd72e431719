//! Batcher configuration.

use std::time::Duration;

use rush_pipeline::GasEstimator;

use crate::BatcherError;

/// Batcher configuration.
///
/// Constructed through [`BatcherConfig::builder`], which validates thresholds,
/// or [`Default`], whose values are always valid.
#[derive(Clone, Debug)]
pub struct BatcherConfig {
    /// Maximum queued events before a size-triggered flush (default: 10).
    pub batch_size: usize,
    /// Idle delay before a timer-triggered flush (default: 5 s).
    pub batch_timeout: Duration,
    /// Aggregate estimated-cost ceiling that triggers a flush (default: 400_000).
    pub max_gas_per_tx: u64,
    /// Priority at which a half-full queue flushes early (default: 8).
    pub priority_threshold: u8,
    /// When false, every submission is encoded verbatim regardless of the
    /// requested strategy (default: true).
    pub compression_enabled: bool,
    /// Local cost model for queued payloads.
    pub estimator: GasEstimator,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_timeout: Duration::from_secs(5),
            max_gas_per_tx: 400_000,
            priority_threshold: 8,
            compression_enabled: true,
            estimator: GasEstimator::default(),
        }
    }
}

impl BatcherConfig {
    /// Creates a new builder for configuring a batcher.
    pub fn builder() -> BatcherConfigBuilder {
        BatcherConfigBuilder::default()
    }
}

/// Builder for [`BatcherConfig`].
#[derive(Clone, Debug)]
pub struct BatcherConfigBuilder {
    batch_size: usize,
    batch_timeout: Duration,
    max_gas_per_tx: u64,
    priority_threshold: u8,
    compression_enabled: bool,
    estimator: GasEstimator,
}

impl Default for BatcherConfigBuilder {
    fn default() -> Self {
        let defaults = BatcherConfig::default();
        Self {
            batch_size: defaults.batch_size,
            batch_timeout: defaults.batch_timeout,
            max_gas_per_tx: defaults.max_gas_per_tx,
            priority_threshold: defaults.priority_threshold,
            compression_enabled: defaults.compression_enabled,
            estimator: defaults.estimator,
        }
    }
}

impl BatcherConfigBuilder {
    /// Sets the maximum events per automatic flush trigger.
    pub const fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the idle delay before a timer-triggered flush.
    pub const fn batch_timeout(mut self, batch_timeout: Duration) -> Self {
        self.batch_timeout = batch_timeout;
        self
    }

    /// Sets the aggregate estimated-cost flush ceiling.
    pub const fn max_gas_per_tx(mut self, max_gas_per_tx: u64) -> Self {
        self.max_gas_per_tx = max_gas_per_tx;
        self
    }

    /// Sets the priority level that flushes a half-full queue early.
    pub const fn priority_threshold(mut self, priority_threshold: u8) -> Self {
        self.priority_threshold = priority_threshold;
        self
    }

    /// Enables or disables compression pipeline-wide.
    pub const fn compression_enabled(mut self, compression_enabled: bool) -> Self {
        self.compression_enabled = compression_enabled;
        self
    }

    /// Sets the local cost model.
    pub const fn estimator(mut self, estimator: GasEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Validates the thresholds and builds the [`BatcherConfig`].
    ///
    /// # Errors
    ///
    /// Rejects a zero batch size, a zero timeout, or a zero gas ceiling.
    pub fn build(self) -> Result<BatcherConfig, BatcherError> {
        if self.batch_size == 0 {
            return Err(BatcherError::InvalidBatchSize(self.batch_size));
        }
        if self.batch_timeout.is_zero() {
            return Err(BatcherError::InvalidTimeout);
        }
        if self.max_gas_per_tx == 0 {
            return Err(BatcherError::InvalidGasCeiling(self.max_gas_per_tx));
        }
        Ok(BatcherConfig {
            batch_size: self.batch_size,
            batch_timeout: self.batch_timeout,
            max_gas_per_tx: self.max_gas_per_tx,
            priority_threshold: self.priority_threshold,
            compression_enabled: self.compression_enabled,
            estimator: self.estimator,
        })
    }
}
