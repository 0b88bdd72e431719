//! Event batcher service: submission routing, flush scheduling, dispatch.

use std::sync::Arc;

use rush_monitor::{UsageMonitor, UsageSummary};
use rush_pipeline::{EventSink, Strategy};
use rush_primitives::{
    now_millis, CompressedEvent, EventBatch, SemanticEvent, SubmissionReceipt, UsageRecord,
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error, info, warn};

use crate::{BatchQueue, BatcherConfig, BatcherError, FlushTrigger};

/// Priority at or above which an event bypasses the queue entirely.
///
/// Fixed constant, deliberately independent of the configurable
/// [`priority_threshold`](BatcherConfig::priority_threshold).
pub const IMMEDIATE_PRIORITY: u8 = 10;

/// Result of a submission, as seen by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Event queued; a flush timer is armed.
    Queued,
    /// The submission tripped a flush trigger; the flush ran inline.
    Flushed(FlushOutcome),
    /// Urgent event delivered through the single-event call path.
    DispatchedImmediately(SubmissionReceipt),
}

/// Result of one flush pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The queue was empty; nothing was dispatched.
    Empty,
    /// The slice was handed to the collaborator in one grouped call.
    Dispatched {
        /// Receipt from the collaborator.
        receipt: SubmissionReceipt,
        /// Events in the dispatched slice.
        items: usize,
        /// Total estimated gas of the slice.
        gas: u64,
    },
    /// The grouped call failed; the slice is back at the front of the queue.
    Requeued {
        /// Events returned to the queue.
        items: usize,
    },
}

/// Shared pipeline state.
///
/// Queue mutation and the flush decision form one critical section behind the
/// queue lock; the usage history is independently atomic since it shares no
/// invariant with the queue.
struct Inner<S> {
    config: BatcherConfig,
    queue: Mutex<BatchQueue>,
    sink: Mutex<S>,
    timer: Mutex<Option<JoinHandle<()>>>,
    monitor: Mutex<UsageMonitor>,
}

/// The batching front door for semantic events.
///
/// Cheap to clone; all clones share one queue, sink, timer slot, and usage
/// history. Urgent events (priority ≥ [`IMMEDIATE_PRIORITY`]) dispatch
/// directly with failures surfaced to the caller; everything else is
/// compressed, cost-estimated, and queued until a flush trigger or the idle
/// timer fires. Batch-path dispatch failures are requeued, never surfaced to
/// the submitter.
pub struct EventBatcher<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for EventBatcher<S> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S> std::fmt::Debug for EventBatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBatcher").field("config", &self.inner.config).finish()
    }
}

impl<S> EventBatcher<S>
where
    S: EventSink + 'static,
{
    /// Creates a batcher over the given sink.
    pub fn new(sink: S, config: BatcherConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                queue: Mutex::new(BatchQueue::new()),
                sink: Mutex::new(sink),
                timer: Mutex::new(None),
                monitor: Mutex::new(UsageMonitor::default()),
            }),
        }
    }

    /// Submits a semantic event with the requested compression strategy.
    ///
    /// Routes by priority: at or above [`IMMEDIATE_PRIORITY`] the event goes
    /// straight to the collaborator (single attempt, failure returned);
    /// otherwise it joins the batch queue, flushing inline when a trigger
    /// fires and (re)arming the idle timer when not.
    ///
    /// # Errors
    ///
    /// Only the immediate path errors; batch-path dispatch failures are
    /// retried on later flushes and never returned here.
    pub async fn submit(
        &self,
        event: SemanticEvent,
        strategy: Strategy,
    ) -> Result<SubmitOutcome, BatcherError> {
        if event.priority >= IMMEDIATE_PRIORITY {
            return self.dispatch_immediate(event).await.map(SubmitOutcome::DispatchedImmediately);
        }

        let strategy = self.effective_strategy(strategy);
        let compressed = self.compress_event(event, strategy);

        let trigger = {
            let mut queue = self.inner.queue.lock().await;
            queue.insert(compressed);
            queue.check_triggers(&self.inner.config)
        };

        match trigger {
            Some(trigger) => {
                let outcome = Self::flush_with(&self.inner, trigger).await;
                Ok(SubmitOutcome::Flushed(outcome))
            }
            None => {
                self.arm_timer().await;
                Ok(SubmitOutcome::Queued)
            }
        }
    }

    /// Flushes the current queue contents on demand.
    pub async fn flush(&self) -> FlushOutcome {
        Self::flush_with(&self.inner, FlushTrigger::Manual).await
    }

    /// Operator escape hatch: drops every queued event and cancels any
    /// pending flush timer. Returns how many events were discarded.
    pub async fn clear(&self) -> usize {
        if let Some(handle) = self.inner.timer.lock().await.take() {
            handle.abort();
        }
        let dropped = self.inner.queue.lock().await.clear();
        if dropped > 0 {
            warn!(dropped, "Queue cleared by operator");
        }
        dropped
    }

    /// Number of events currently queued.
    pub async fn queue_len(&self) -> usize {
        self.inner.queue.lock().await.len()
    }

    /// Aggregate estimated cost of the queued events.
    pub async fn queued_cost(&self) -> u64 {
        self.inner.queue.lock().await.total_cost()
    }

    /// Snapshot of the usage history's derived metrics.
    pub async fn usage(&self) -> UsageSummary {
        self.inner.monitor.lock().await.summary()
    }

    /// The batcher's configuration.
    pub fn config(&self) -> &BatcherConfig {
        &self.inner.config
    }

    /// Single-attempt urgent dispatch, bypassing the queue.
    ///
    /// Latency matters more than payload size here, so the cheap `basic`
    /// strategy is used regardless of what the caller asked for.
    async fn dispatch_immediate(
        &self,
        event: SemanticEvent,
    ) -> Result<SubmissionReceipt, BatcherError> {
        let strategy = self.effective_strategy(Strategy::Basic);
        let payload = rush_compress::compress(&event.attributes, strategy);

        let result = {
            let mut sink = self.inner.sink.lock().await;
            sink.submit_single(
                event.kind,
                event.actor,
                event.occurred_at,
                &event.correlation_id,
                &payload,
            )
            .await
        };

        match result {
            Ok(receipt) => {
                debug!(priority = event.priority, "Immediate dispatch succeeded");
                Ok(receipt)
            }
            Err(err) => {
                error!(%err, priority = event.priority, "Immediate dispatch failed");
                Err(BatcherError::ImmediateDispatch(err))
            }
        }
    }

    /// Drains the queue and issues one grouped call.
    ///
    /// Failure requeues the whole slice at the front so it leads the next
    /// flush; nothing is lost or duplicated either way.
    async fn flush_with(inner: &Arc<Inner<S>>, trigger: FlushTrigger) -> FlushOutcome {
        // Disarm any pending timer first: one timer live at a time, and a
        // trigger-driven flush supersedes it.
        if let Some(handle) = inner.timer.lock().await.take() {
            handle.abort();
        }

        let slice = { inner.queue.lock().await.drain() };
        if slice.is_empty() {
            return FlushOutcome::Empty;
        }

        let items = slice.len();
        let gas: u64 = slice.iter().map(|e| e.estimated_cost).sum();
        let batch = EventBatch::from_events(&slice);

        let result = {
            let mut sink = inner.sink.lock().await;
            sink.submit_batch(batch).await
        };

        match result {
            Ok(receipt) => {
                info!(items, gas, ?trigger, "Dispatched batch");
                inner.monitor.lock().await.record(UsageRecord {
                    timestamp: now_millis(),
                    gas_used: gas,
                    item_count: items,
                    // Batches are usually strategy-homogeneous; label by the
                    // leading event.
                    strategy: slice[0].strategy_label,
                });
                FlushOutcome::Dispatched { receipt, items, gas }
            }
            Err(err) => {
                warn!(%err, items, ?trigger, "Batch dispatch failed; requeueing slice");
                inner.queue.lock().await.requeue_front(slice);
                FlushOutcome::Requeued { items }
            }
        }
    }

    /// (Re)arms the idle flush timer, cancelling any previously pending one.
    async fn arm_timer(&self) {
        let timeout = self.inner.config.batch_timeout;
        let inner = Arc::clone(&self.inner);

        let mut slot = self.inner.timer.lock().await;
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            // Disarm before flushing so a concurrent trigger flush cannot
            // abort this task mid-dispatch.
            inner.timer.lock().await.take();
            Self::flush_with(&inner, FlushTrigger::Timeout).await;
        }));
    }

    fn effective_strategy(&self, requested: Strategy) -> Strategy {
        if self.inner.config.compression_enabled {
            requested
        } else {
            Strategy::None
        }
    }

    fn compress_event(&self, event: SemanticEvent, strategy: Strategy) -> CompressedEvent {
        let encoded = rush_compress::compress(&event.attributes, strategy);
        let estimated_cost = self.inner.config.estimator.estimate(&encoded);
        CompressedEvent {
            kind: event.kind,
            actor: event.actor,
            occurred_at: event.occurred_at,
            correlation_id: event.correlation_id,
            priority: event.priority,
            encoded,
            strategy_label: strategy.label(),
            estimated_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use rush_monitor::Trend;
    use rush_pipeline::SinkError;
    use rush_primitives::{Address, AttrKey, AttrValue, Attributes, EventKind, B256};
    use tokio::sync::Mutex as AsyncMutex;

    use super::*;

    /// Recording sink whose batch path can be toggled to fail.
    #[derive(Clone)]
    struct RecordingSink {
        batches: Arc<AsyncMutex<Vec<EventBatch>>>,
        singles: Arc<AsyncMutex<Vec<(EventKind, String)>>>,
        fail_batches: Arc<AtomicBool>,
        fail_singles: Arc<AtomicBool>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                batches: Arc::new(AsyncMutex::new(Vec::new())),
                singles: Arc::new(AsyncMutex::new(Vec::new())),
                fail_batches: Arc::new(AtomicBool::new(false)),
                fail_singles: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn submit_batch(
            &mut self,
            batch: EventBatch,
        ) -> Result<SubmissionReceipt, SinkError> {
            if self.fail_batches.load(Ordering::SeqCst) {
                return Err(SinkError::Rejected("reverted".to_string()));
            }
            self.batches.lock().await.push(batch);
            Ok(SubmissionReceipt { tx_hash: B256::repeat_byte(0xAB) })
        }

        async fn submit_single(
            &mut self,
            kind: EventKind,
            _actor: Address,
            _timestamp: u64,
            _correlation_id: &str,
            payload: &str,
        ) -> Result<SubmissionReceipt, SinkError> {
            if self.fail_singles.load(Ordering::SeqCst) {
                return Err(SinkError::Timeout);
            }
            self.singles.lock().await.push((kind, payload.to_string()));
            Ok(SubmissionReceipt { tx_hash: B256::repeat_byte(0xCD) })
        }
    }

    fn event(priority: u8, attributes: Attributes) -> SemanticEvent {
        SemanticEvent::new(
            EventKind::PlayerAction,
            Address::repeat_byte(0x11),
            "session-1",
            attributes,
            priority,
        )
    }

    fn score_attrs(name: &str, value: i64) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert(AttrKey::from_name(name), AttrValue::Int(value));
        attrs
    }

    fn config(batch_size: usize) -> BatcherConfig {
        BatcherConfig::builder()
            .batch_size(batch_size)
            .batch_timeout(Duration::from_millis(5_000))
            .max_gas_per_tx(1_000_000)
            .priority_threshold(9)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn size_threshold_flushes_exactly_once() {
        let sink = RecordingSink::new();
        let batches = sink.batches.clone();
        let batcher = EventBatcher::new(sink, config(3));

        for priority in [2, 8, 1] {
            let outcome = batcher.submit(event(priority, score_attrs("score", 10)), Strategy::Basic).await.unwrap();
            if priority == 1 {
                assert!(matches!(outcome, SubmitOutcome::Flushed(FlushOutcome::Dispatched { items: 3, .. })));
            } else {
                assert_eq!(outcome, SubmitOutcome::Queued);
            }
        }

        assert_eq!(batches.lock().await.len(), 1);
        assert_eq!(batcher.queue_len().await, 0);
    }

    #[tokio::test]
    async fn worked_example_orders_and_aliases() {
        // batch_size 3, priorities [2, 8, 1], basic strategy: the third
        // submission trips the size trigger and the slice is stable-sorted
        // descending by priority.
        let sink = RecordingSink::new();
        let batches = sink.batches.clone();
        let batcher = EventBatcher::new(sink, config(3));

        batcher.submit(event(2, score_attrs("score", 10)), Strategy::Basic).await.unwrap();
        batcher.submit(event(8, score_attrs("coins", 5)), Strategy::Basic).await.unwrap();
        batcher.submit(event(1, score_attrs("level", 2)), Strategy::Basic).await.unwrap();

        let batches = batches.lock().await;
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.payloads, vec![r#"{"1":5}"#, r#"{"0":10}"#, r#"{"2":2}"#]);
    }

    #[tokio::test]
    async fn gas_ceiling_flushes_before_size() {
        let sink = RecordingSink::new();
        let batches = sink.batches.clone();
        let config = BatcherConfig::builder()
            .batch_size(10)
            .max_gas_per_tx(50_000)
            .priority_threshold(9)
            .build()
            .unwrap();
        let batcher = EventBatcher::new(sink, config);

        // Each basic-compressed event estimates at ~26k; two cross 50k.
        batcher.submit(event(1, score_attrs("score", 10)), Strategy::Basic).await.unwrap();
        let outcome =
            batcher.submit(event(1, score_attrs("coins", 5)), Strategy::Basic).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Flushed(FlushOutcome::Dispatched { items: 2, .. })));
        assert_eq!(batches.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_batch_requeues_in_order() {
        let sink = RecordingSink::new();
        let fail = sink.fail_batches.clone();
        let batches = sink.batches.clone();
        let batcher = EventBatcher::new(sink, config(3));

        fail.store(true, Ordering::SeqCst);
        batcher.submit(event(2, score_attrs("score", 10)), Strategy::Basic).await.unwrap();
        batcher.submit(event(8, score_attrs("coins", 5)), Strategy::Basic).await.unwrap();
        let outcome =
            batcher.submit(event(1, score_attrs("level", 2)), Strategy::Basic).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Flushed(FlushOutcome::Requeued { items: 3 }));
        assert_eq!(batcher.queue_len().await, 3);

        // Next flush retries the same slice, front first, nothing lost.
        fail.store(false, Ordering::SeqCst);
        let outcome = batcher.flush().await;
        assert!(matches!(outcome, FlushOutcome::Dispatched { items: 3, .. }));

        let batches = batches.lock().await;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].payloads, vec![r#"{"1":5}"#, r#"{"0":10}"#, r#"{"2":2}"#]);
        assert_eq!(batcher.queue_len().await, 0);
    }

    #[tokio::test]
    async fn immediate_priority_bypasses_queue() {
        let sink = RecordingSink::new();
        let singles = sink.singles.clone();
        let batches = sink.batches.clone();
        let batcher = EventBatcher::new(sink, config(3));

        let outcome = batcher
            .submit(event(IMMEDIATE_PRIORITY, score_attrs("score", 500)), Strategy::Maximum)
            .await
            .unwrap();

        assert!(matches!(outcome, SubmitOutcome::DispatchedImmediately(_)));
        assert_eq!(batcher.queue_len().await, 0);
        assert!(batches.lock().await.is_empty());

        // Immediate path compresses with basic regardless of the request.
        let singles = singles.lock().await;
        assert_eq!(singles.len(), 1);
        assert_eq!(singles[0].1, r#"{"0":500}"#);
    }

    #[tokio::test]
    async fn immediate_failure_surfaces_to_caller() {
        let sink = RecordingSink::new();
        sink.fail_singles.store(true, Ordering::SeqCst);
        let batcher = EventBatcher::new(sink, config(3));

        let err = batcher
            .submit(event(IMMEDIATE_PRIORITY, score_attrs("score", 1)), Strategy::Basic)
            .await
            .unwrap_err();

        assert!(matches!(err, BatcherError::ImmediateDispatch(SinkError::Timeout)));
        assert_eq!(batcher.queue_len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_flushes_idle_queue() {
        let sink = RecordingSink::new();
        let batches = sink.batches.clone();
        let batcher = EventBatcher::new(sink, config(10));

        batcher.submit(event(1, score_attrs("score", 10)), Strategy::Basic).await.unwrap();
        assert_eq!(batcher.queue_len().await, 1);

        tokio::time::sleep(Duration::from_millis(5_100)).await;
        tokio::task::yield_now().await;

        assert_eq!(batcher.queue_len().await, 0);
        assert_eq!(batches.lock().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_cancels_previous_timer() {
        let sink = RecordingSink::new();
        let batches = sink.batches.clone();
        let batcher = EventBatcher::new(sink, config(10));

        batcher.submit(event(1, score_attrs("score", 10)), Strategy::Basic).await.unwrap();
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        // Second submission rearms; the first timer must not fire at 5s.
        batcher.submit(event(1, score_attrs("coins", 5)), Strategy::Basic).await.unwrap();
        tokio::time::sleep(Duration::from_millis(3_000)).await;

        // 6s in: only the aborted timer would have fired by now.
        assert_eq!(batches.lock().await.len(), 0);
        assert_eq!(batcher.queue_len().await, 2);

        tokio::time::sleep(Duration::from_millis(2_100)).await;
        tokio::task::yield_now().await;

        // One timeout flush containing both events, never two.
        let batches = batches.lock().await;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].payloads.len(), 2);
    }

    #[tokio::test]
    async fn manual_flush_of_empty_queue_is_noop() {
        let sink = RecordingSink::new();
        let batches = sink.batches.clone();
        let batcher = EventBatcher::new(sink, config(10));

        assert_eq!(batcher.flush().await, FlushOutcome::Empty);
        assert!(batches.lock().await.is_empty());
    }

    #[tokio::test]
    async fn clear_drops_queue_and_timer() {
        let sink = RecordingSink::new();
        let batches = sink.batches.clone();
        let batcher = EventBatcher::new(sink, config(10));

        batcher.submit(event(1, score_attrs("score", 10)), Strategy::Basic).await.unwrap();
        batcher.submit(event(2, score_attrs("coins", 5)), Strategy::Basic).await.unwrap();

        assert_eq!(batcher.clear().await, 2);
        assert_eq!(batcher.queue_len().await, 0);
        assert!(batches.lock().await.is_empty());
    }

    #[tokio::test]
    async fn compression_disabled_forces_verbatim() {
        let sink = RecordingSink::new();
        let batches = sink.batches.clone();
        let config = BatcherConfig::builder()
            .batch_size(1)
            .compression_enabled(false)
            .build()
            .unwrap();
        let batcher = EventBatcher::new(sink, config);

        batcher.submit(event(1, score_attrs("score", 10)), Strategy::Maximum).await.unwrap();

        let batches = batches.lock().await;
        assert_eq!(batches[0].payloads, vec![r#"{"score":10}"#]);
    }

    #[tokio::test]
    async fn successful_flush_records_usage() {
        let sink = RecordingSink::new();
        let batcher = EventBatcher::new(sink, config(2));

        batcher.submit(event(1, score_attrs("score", 10)), Strategy::Basic).await.unwrap();
        batcher.submit(event(1, score_attrs("coins", 5)), Strategy::Basic).await.unwrap();

        let usage = batcher.usage().await;
        assert_eq!(usage.record_count, 1);
        assert_eq!(usage.total_items, 2);
        assert!(usage.total_gas > 0);
        assert_eq!(usage.trend, Trend::Stable);
    }

    #[tokio::test]
    async fn failed_flush_records_nothing() {
        let sink = RecordingSink::new();
        sink.fail_batches.store(true, Ordering::SeqCst);
        let batcher = EventBatcher::new(sink, config(2));

        batcher.submit(event(1, score_attrs("score", 10)), Strategy::Basic).await.unwrap();
        batcher.submit(event(1, score_attrs("coins", 5)), Strategy::Basic).await.unwrap();

        let usage = batcher.usage().await;
        assert_eq!(usage.record_count, 0);
        assert_eq!(batcher.queue_len().await, 2);
    }

    #[tokio::test]
    async fn priority_trigger_flushes_half_full_queue() {
        let sink = RecordingSink::new();
        let batches = sink.batches.clone();
        let config = BatcherConfig::builder()
            .batch_size(4)
            .max_gas_per_tx(1_000_000)
            .priority_threshold(5)
            .build()
            .unwrap();
        let batcher = EventBatcher::new(sink, config);

        batcher.submit(event(8, score_attrs("score", 10)), Strategy::Basic).await.unwrap();
        let outcome =
            batcher.submit(event(1, score_attrs("coins", 5)), Strategy::Basic).await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Flushed(FlushOutcome::Dispatched { items: 2, .. })));
        assert_eq!(batches.lock().await.len(), 1);
    }
}
