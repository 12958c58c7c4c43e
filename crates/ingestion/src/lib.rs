//! The ingestion of the rollup ledger from the L1.
//!
//! The [`L1Ingestion`] polls the L1 for the events of the rollup contracts over ranges of blocks
//! behind the safe head, runs the [`EventHandler`] of each event kind and commits the entries of
//! a range along with the synced cursor in a single database transaction.

pub use address::{AddressEpochs, AddressResolver};
mod address;

pub use cache::{CachedL1Client, BLOCK_CACHE_CAPACITY, TRANSACTION_CACHE_CAPACITY};
mod cache;

pub mod client;
use client::{L1Client, LogQuery};

pub use context::{l1_context, L1Context};
mod context;

pub use error::{EthRequestError, FilterLogError, IngestionError, IngestionResult};
mod error;

pub mod handlers;
pub use handlers::{
    EnqueueHandler, EventHandler, EventKind, ObservedEvent, SequencerBatchHandler,
    StateBatchHandler,
};

pub use metrics::IngestionMetrics;
mod metrics;

pub use retry::{CanRetry, RetryDecision, RetryPolicy};
mod retry;

/// Test utils for the ingestion.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolCall;
use dtl_db::{Database, DatabaseReadOperations, DatabaseWriteOperations, TXMut};
use dtl_l1::{abi::calls::ovmCHAINIDCall, TrackedContract};
use dtl_primitives::IngestionConfig;
use std::{collections::HashMap, sync::Arc, time::Instant};

/// The states of the [`L1Ingestion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum IngestionState {
    /// The cursor and the contract addresses are loaded.
    Init,
    /// Ranges behind the safe head are synced.
    Syncing,
    /// The cursor reached the safe head, waiting for new blocks.
    Idle,
    /// A fatal error occurred.
    Error,
}

/// The logs of the rollup events emitted in a range, by event kind.
#[derive(Debug, Default)]
struct RangeLogs(HashMap<EventKind, Vec<Log>>);

impl RangeLogs {
    fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    fn of(&self, kind: EventKind) -> &[Log] {
        self.0.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }
}

/// The ingestion of the rollup events from the L1 into the [`Database`].
///
/// The ingestion is driven by [`L1Ingestion::step`], which runs the work of the current
/// [`IngestionState`] and returns the next one. The cursor, the highest L1 block fully synced,
/// only advances once all the entries of a range are committed.
pub struct L1Ingestion<C> {
    /// The L1 client.
    client: CachedL1Client<C>,
    /// The database.
    db: Arc<Database>,
    /// The configuration.
    config: IngestionConfig,
    /// The resolver of the contract addresses.
    resolver: AddressResolver,
    /// The highest L1 block fully synced, if any.
    cursor: Option<u64>,
    /// The current state.
    state: IngestionState,
    /// The retry policy for failing ranges.
    retry: RetryPolicy,
    /// The fatal error, set on the transition to [`IngestionState::Error`].
    error: Option<IngestionError>,
    /// The ingestion metrics.
    metrics: IngestionMetrics,
}

impl<C> std::fmt::Debug for L1Ingestion<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L1Ingestion")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .field("cursor", &self.cursor)
            .field("state", &self.state)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<C: L1Client> L1Ingestion<C> {
    /// Returns a new [`L1Ingestion`] in the [`IngestionState::Init`] state.
    pub fn new(client: C, db: Arc<Database>, config: IngestionConfig) -> Self {
        let retry =
            RetryPolicy::new(config.tolerant, config.max_range_retries, config.retry_backoff);
        Self {
            client: CachedL1Client::new(client),
            db,
            resolver: AddressResolver::new(config.address_manager),
            cursor: config.start_l1_block.checked_sub(1),
            state: IngestionState::Init,
            retry,
            error: None,
            metrics: IngestionMetrics::default(),
            config,
        }
    }

    /// Returns the current state.
    pub const fn state(&self) -> IngestionState {
        self.state
    }

    /// Returns the highest L1 block fully synced, if any.
    pub const fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Returns the resolver of the contract addresses.
    pub const fn resolver(&self) -> &AddressResolver {
        &self.resolver
    }

    /// Returns the fatal error, if the ingestion is in the [`IngestionState::Error`] state.
    pub const fn error(&self) -> Option<&IngestionError> {
        self.error.as_ref()
    }

    /// Drives the ingestion until a fatal error occurs and returns it.
    pub async fn run(&mut self) -> IngestionResult<()> {
        loop {
            if self.step().await == IngestionState::Error {
                return self.error.take().map_or(Ok(()), Err)
            }
        }
    }

    /// Runs the work of the current state and returns the next state.
    pub async fn step(&mut self) -> IngestionState {
        let next = match self.state {
            IngestionState::Init => match self.init().await {
                Ok(()) => {
                    self.retry.reset();
                    IngestionState::Syncing
                }
                Err(err) => self.on_failure(err).await,
            },
            IngestionState::Syncing => match self.sync().await {
                Ok(next) => {
                    self.retry.reset();
                    next
                }
                Err(err) => self.on_failure(err).await,
            },
            IngestionState::Idle => {
                tokio::time::sleep(self.config.polling_interval).await;
                IngestionState::Syncing
            }
            IngestionState::Error => IngestionState::Error,
        };

        if next != self.state {
            tracing::debug!(target: "dtl::ingestion", from = %self.state, to = %next, cursor = ?self.cursor, "state transition");
        }
        self.state = next;
        next
    }

    /// Applies the retry policy to the error. Returns the current state after the backoff if the
    /// work is retried, [`IngestionState::Error`] otherwise.
    async fn on_failure(&mut self, err: IngestionError) -> IngestionState {
        match self.retry.on_failure(&err) {
            RetryDecision::Retry(delay) => {
                tracing::warn!(target: "dtl::ingestion", ?err, attempt = self.retry.attempts(), ?delay, cursor = ?self.cursor, "retrying after failure");
                self.metrics.range_retries.increment(1);
                tokio::time::sleep(delay).await;
                self.state
            }
            RetryDecision::Escalate => {
                tracing::error!(target: "dtl::ingestion", ?err, cursor = ?self.cursor, "fatal ingestion error");
                self.error = Some(err);
                IngestionState::Error
            }
        }
    }

    /// Loads the cursor, resolves the contract addresses at the cursor and stores the L2 chain
    /// id.
    async fn init(&mut self) -> IngestionResult<()> {
        let cursor = match self.db.get_synced_l1_block().await? {
            Some(cursor) => Some(cursor),
            None => self.config.start_l1_block.checked_sub(1),
        };

        // Nothing synced from genesis, the addresses set at block 0 are replayed by the first
        // range.
        let resolve_at = cursor.unwrap_or_default();
        for contract in TrackedContract::ALL {
            self.resolver.resolve_address(&self.client, contract, resolve_at).await?;
        }

        let head = self.client.block_number().await?;
        let execution_manager = self
            .resolver
            .fetch_address(&self.client, TrackedContract::ExecutionManager, head)
            .await?;
        let chain_id = if execution_manager.is_zero() {
            tracing::warn!(target: "dtl::ingestion", head, "execution manager not registered, skipping chain id");
            None
        } else {
            let output = self
                .client
                .call(execution_manager, ovmCHAINIDCall {}.abi_encode().into(), head)
                .await?;
            let chain_id = ovmCHAINIDCall::abi_decode_returns(&output).map_err(|error| {
                EthRequestError::InvalidReturnData { method: "ovmCHAINID", error }
            })?;
            let chain_id = handlers::to_u64("chainId", chain_id)?;

            let tx = self.db.tx_mut().await?;
            tx.set_l2_chain_id(chain_id).await?;
            tx.commit().await?;
            Some(chain_id)
        };

        self.cursor = cursor;
        if let Some(cursor) = cursor {
            self.metrics.synced_l1_block.set(cursor as f64);
        }
        tracing::info!(target: "dtl::ingestion", ?cursor, ?chain_id, "initialized ingestion");

        Ok(())
    }

    /// Syncs the next range behind the safe head. Returns [`IngestionState::Idle`] if the cursor
    /// is at the safe head.
    async fn sync(&mut self) -> IngestionResult<IngestionState> {
        let head = self.client.block_number().await?;
        let safe_head = head.saturating_sub(self.config.confirmations);
        let from = self.cursor.map_or(self.config.start_l1_block, |cursor| cursor + 1);
        if from > safe_head {
            return Ok(IngestionState::Idle)
        }

        let now = Instant::now();
        let mut to =
            from.saturating_add(self.config.log_query_block_range.max(1) - 1).min(safe_head);

        let (epochs, logs) = loop {
            let epochs = self.resolver.epochs(&self.client, from, to).await?;
            let logs = self.fetch_logs(&epochs, from, to).await?;
            if logs.len() <= self.config.max_logs_per_range || to == from {
                break (epochs, logs)
            }
            tracing::debug!(target: "dtl::ingestion", from, to, count = logs.len(), "halving range");
            self.metrics.halved_ranges.increment(1);
            to = from + (to - from) / 2;
        };

        let (enqueues, sequencer_batches, state_batches) = tokio::try_join!(
            self.extra_data(&EnqueueHandler, &logs),
            self.extra_data(&SequencerBatchHandler, &logs),
            self.extra_data(&StateBatchHandler, &logs),
        )?;

        let enqueues = parse(&EnqueueHandler, enqueues)?;
        let sequencer_batches = parse(&SequencerBatchHandler, sequencer_batches)?;
        let state_batches = parse(&StateBatchHandler, state_batches)?;

        let counts = [
            (EnqueueHandler::KIND, enqueues.len()),
            (SequencerBatchHandler::KIND, sequencer_batches.len()),
            (StateBatchHandler::KIND, state_batches.len()),
        ];
        let transactions: usize = sequencer_batches.iter().map(|e| e.transactions.len()).sum();
        let state_roots: usize = state_batches.iter().map(|e| e.state_roots.len()).sum();

        let tx = self.db.tx_mut().await?;
        store(&EnqueueHandler, enqueues, &tx).await?;
        store(&SequencerBatchHandler, sequencer_batches, &tx).await?;
        store(&StateBatchHandler, state_batches, &tx).await?;
        tx.set_synced_l1_block(to).await?;
        tx.commit().await?;

        self.resolver.commit(&epochs);
        self.cursor = Some(to);

        for (kind, count) in counts {
            self.metrics.process_events(kind, count);
        }
        self.metrics.transactions.increment(transactions as u64);
        self.metrics.state_roots.increment(state_roots as u64);
        self.metrics.synced_l1_block.set(to as f64);
        self.metrics.range_duration.record(now.elapsed().as_millis() as f64);

        let [(_, enqueues), (_, sequencer_batches), (_, state_batches)] = counts;
        if enqueues + sequencer_batches + state_batches == 0 {
            tracing::debug!(target: "dtl::ingestion", from, to, "synced empty range");
        } else {
            tracing::info!(target: "dtl::ingestion", from, to, enqueues, sequencer_batches, state_batches, transactions, state_roots, "synced range");
        }

        Ok(IngestionState::Syncing)
    }

    /// Fetches the logs of the rollup events over the range.
    async fn fetch_logs(
        &self,
        epochs: &AddressEpochs,
        from: u64,
        to: u64,
    ) -> IngestionResult<RangeLogs> {
        let logs = futures::future::try_join_all(
            EventKind::ALL.map(|kind| self.logs_of(epochs, kind, from, to)),
        )
        .await?;
        Ok(RangeLogs(EventKind::ALL.into_iter().zip(logs).collect()))
    }

    /// Fetches the logs of the event kind emitted over the range by any address of the emitting
    /// contract in the range.
    async fn logs_of(
        &self,
        epochs: &AddressEpochs,
        kind: EventKind,
        from: u64,
        to: u64,
    ) -> IngestionResult<Vec<Log>> {
        let addresses = epochs.addresses(kind.contract());
        if addresses.is_empty() {
            return Ok(Vec::new())
        }
        if addresses.len() > 1 {
            tracing::debug!(target: "dtl::ingestion", %kind, ?addresses, from, to, "contract address changed within range");
        }

        let query = LogQuery {
            addresses,
            event_signature: kind.signature(),
            from_block: from,
            to_block: to,
        };
        Ok(self.client.logs(&query).await?)
    }

    /// Decodes the logs of the handler's event kind and fetches the extra data of the events
    /// concurrently.
    async fn extra_data<H: EventHandler>(
        &self,
        handler: &H,
        logs: &RangeLogs,
    ) -> IngestionResult<Vec<(ObservedEvent<H::Event>, H::ExtraData)>> {
        let events = logs
            .of(H::KIND)
            .iter()
            .map(ObservedEvent::<H::Event>::try_from_log)
            .collect::<IngestionResult<Vec<_>>>()?;
        let extra_data = futures::future::try_join_all(
            events.iter().map(|event| handler.get_extra_data(event, &self.client)),
        )
        .await?;
        Ok(events.into_iter().zip(extra_data).collect())
    }
}

/// Parses the events with their extra data into entries.
fn parse<H: EventHandler>(
    handler: &H,
    events: Vec<(ObservedEvent<H::Event>, H::ExtraData)>,
) -> IngestionResult<Vec<H::Entries>> {
    events.into_iter().map(|(event, extra_data)| handler.parse_event(&event, extra_data)).collect()
}

/// Stores the entries in order.
async fn store<H: EventHandler>(
    handler: &H,
    entries: Vec<H::Entries>,
    tx: &TXMut,
) -> IngestionResult<()> {
    tracing::trace!(target: "dtl::ingestion", kind = %H::KIND, count = entries.len(), "storing entries");
    for entries in entries {
        handler.store_event(entries, tx).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_config, MockL1Client};

    use alloy_primitives::Address;
    use dtl_db::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_should_idle_at_safe_head() -> eyre::Result<()> {
        // Given
        let client = MockL1Client::default();
        client.register(TrackedContract::CanonicalTransactionChain, Address::with_last_byte(1));
        client.mine(10);
        let db = Arc::new(setup_test_db().await);
        let config = IngestionConfig { confirmations: 4, log_query_block_range: 3, ..test_config() };
        let mut ingestion = L1Ingestion::new(client.clone(), db.clone(), config);

        // When
        let mut states = Vec::new();
        for _ in 0..6 {
            states.push(ingestion.step().await);
        }

        // Then
        assert_eq!(
            states,
            vec![
                IngestionState::Syncing,
                IngestionState::Syncing,
                IngestionState::Syncing,
                IngestionState::Syncing,
                IngestionState::Idle,
                IngestionState::Syncing,
            ]
        );
        assert_eq!(ingestion.cursor(), Some(7));
        assert_eq!(db.get_synced_l1_block().await?, Some(7));
        let mut queries = client.log_queries();
        queries.dedup();
        assert_eq!(queries, vec![(0, 2), (3, 5), (6, 7)]);

        Ok(())
    }

    #[tokio::test]
    async fn test_should_resume_from_persisted_cursor() -> eyre::Result<()> {
        let client = MockL1Client::default();
        client.mine(5);
        let db = Arc::new(setup_test_db().await);
        let tx = db.tx_mut().await?;
        tx.set_synced_l1_block(3).await?;
        tx.commit().await?;

        let config = IngestionConfig { start_l1_block: 1, ..test_config() };
        let mut ingestion = L1Ingestion::new(client, db, config);

        assert_eq!(ingestion.step().await, IngestionState::Syncing);
        assert_eq!(ingestion.cursor(), Some(3));

        Ok(())
    }

    #[tokio::test]
    async fn test_should_scan_start_block() -> eyre::Result<()> {
        // Given
        let client = MockL1Client::default();
        client.register(TrackedContract::CanonicalTransactionChain, Address::with_last_byte(1));
        let db = Arc::new(setup_test_db().await);
        let mut ingestion = L1Ingestion::new(client.clone(), db.clone(), test_config());
        assert_eq!(ingestion.cursor(), None);

        // When
        ingestion.step().await;
        ingestion.step().await;

        // Then
        assert_eq!(client.log_queries().first(), Some(&(0, client.head())));
        assert_eq!(ingestion.cursor(), Some(client.head()));
        assert_eq!(db.get_synced_l1_block().await?, Some(client.head()));

        Ok(())
    }

    #[tokio::test]
    async fn test_should_reset_retries_after_init() -> eyre::Result<()> {
        // Given
        let client = MockL1Client::default();
        client.register(TrackedContract::CanonicalTransactionChain, Address::with_last_byte(1));
        client.mine(2);
        let db = Arc::new(setup_test_db().await);
        let config = test_config();
        let max_retries = config.max_range_retries;
        let mut ingestion = L1Ingestion::new(client.clone(), db, config);

        // When
        client.fail_next(max_retries);
        let mut states = Vec::new();
        for _ in 0..=max_retries {
            states.push(ingestion.step().await);
        }
        client.fail_next(max_retries);
        for _ in 0..=max_retries {
            states.push(ingestion.step().await);
        }

        // Then
        let mut expected = vec![IngestionState::Init; max_retries];
        expected.extend(std::iter::repeat_n(IngestionState::Syncing, max_retries + 2));
        assert_eq!(states, expected);
        assert!(ingestion.error().is_none());
        assert_eq!(ingestion.cursor(), Some(client.head()));

        Ok(())
    }
}
