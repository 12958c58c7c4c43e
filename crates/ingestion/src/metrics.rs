use crate::EventKind;

use metrics::{Counter, Gauge, Histogram};
use metrics_derive::Metrics;

/// The metrics for the [`super::L1Ingestion`].
#[derive(Metrics, Clone)]
#[metrics(scope = "dtl_ingestion")]
pub struct IngestionMetrics {
    /// A counter on the enqueued transactions processed.
    pub enqueues: Counter,
    /// A counter on the sequencer batches processed.
    pub transaction_batches: Counter,
    /// A counter on the ledger transactions processed.
    pub transactions: Counter,
    /// A counter on the state batches processed.
    pub state_batches: Counter,
    /// A counter on the state roots processed.
    pub state_roots: Counter,
    /// A counter on the range retries.
    pub range_retries: Counter,
    /// A counter on the ranges halved for exceeding the logs budget.
    pub halved_ranges: Counter,
    /// The highest L1 block fully synced.
    pub synced_l1_block: Gauge,
    /// A histogram of the duration (ms) to sync a range.
    pub range_duration: Histogram,
}

impl IngestionMetrics {
    /// Records the count of events of the provided kind processed in a range.
    pub fn process_events(&self, kind: EventKind, count: usize) {
        let count = count as u64;
        match kind {
            EventKind::TransactionEnqueued => self.enqueues.increment(count),
            EventKind::SequencerBatchAppended => self.transaction_batches.increment(count),
            EventKind::StateBatchAppended => self.state_batches.increment(count),
        }
    }
}
