//! The handlers of the L1 events of the rollup contracts.
//!
//! Each event kind is processed in three stages: the extra data required by the event is
//! fetched from the L1, the event and its extra data are parsed into the entries of the store,
//! and the entries are stored. Only the first stage performs network calls.

use crate::{client::L1Client, FilterLogError, IngestionError, IngestionResult};

use alloy_primitives::{Address, B256, U256};
use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolEvent;
use dtl_db::DatabaseWriteOperations;
use dtl_primitives::BatchEntry;
use dtl_l1::{
    abi::logs::{SequencerBatchAppended, StateBatchAppended, TransactionEnqueued},
    TrackedContract,
};

pub use enqueue::EnqueueHandler;
mod enqueue;

pub use sequencer_batch::{SequencerBatchExtraData, SequencerBatchHandler};
mod sequencer_batch;

pub use state_batch::{StateBatchExtraData, StateBatchHandler};
mod state_batch;

/// The kinds of events ingested from the L1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum EventKind {
    /// A transaction was enqueued on the canonical transaction chain.
    TransactionEnqueued,
    /// A sequencer batch was appended to the canonical transaction chain.
    SequencerBatchAppended,
    /// A state batch was appended to the state commitment chain.
    StateBatchAppended,
}

impl EventKind {
    /// All the event kinds, in the order their entries are stored.
    pub const ALL: [Self; 3] =
        [Self::TransactionEnqueued, Self::SequencerBatchAppended, Self::StateBatchAppended];

    /// Returns the contract emitting the events of this kind.
    pub const fn contract(&self) -> TrackedContract {
        match self {
            Self::TransactionEnqueued | Self::SequencerBatchAppended => {
                TrackedContract::CanonicalTransactionChain
            }
            Self::StateBatchAppended => TrackedContract::StateCommitmentChain,
        }
    }

    /// Returns the signature hash of the events of this kind.
    pub const fn signature(&self) -> B256 {
        match self {
            Self::TransactionEnqueued => TransactionEnqueued::SIGNATURE_HASH,
            Self::SequencerBatchAppended => SequencerBatchAppended::SIGNATURE_HASH,
            Self::StateBatchAppended => StateBatchAppended::SIGNATURE_HASH,
        }
    }
}

/// An event decoded from an L1 log, along with the position of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedEvent<E> {
    /// The decoded event.
    pub event: E,
    /// The address of the emitter.
    pub address: Address,
    /// The block the log was emitted at.
    pub block_number: u64,
    /// The hash of the transaction which emitted the log.
    pub transaction_hash: B256,
    /// The index of the log in the block.
    pub log_index: u64,
}

impl<E: SolEvent> ObservedEvent<E> {
    /// Decodes the log into an [`ObservedEvent`].
    pub fn try_from_log(log: &Log) -> IngestionResult<Self> {
        let event = E::decode_log(&log.inner)
            .map_err(|error| FilterLogError::DecodeLogFailed { log_type: E::SIGNATURE, error })?
            .data;
        Ok(Self {
            event,
            address: log.address(),
            block_number: log.block_number.ok_or(FilterLogError::MissingBlockNumber)?,
            transaction_hash: log.transaction_hash.ok_or(FilterLogError::MissingTransactionHash)?,
            log_index: log.log_index.ok_or(FilterLogError::MissingLogIndex)?,
        })
    }
}

/// The handler of an L1 event kind.
#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    /// The handled event.
    type Event: SolEvent + Send + Sync;
    /// The data fetched from the L1 to parse the event.
    type ExtraData: Send;
    /// The entries the event is parsed into.
    type Entries: Send;

    /// The kind of the handled event.
    const KIND: EventKind;

    /// Fetches the extra data required to parse the event.
    async fn get_extra_data<C: L1Client>(
        &self,
        event: &ObservedEvent<Self::Event>,
        client: &C,
    ) -> IngestionResult<Self::ExtraData>;

    /// Parses the event and its extra data into entries.
    fn parse_event(
        &self,
        event: &ObservedEvent<Self::Event>,
        extra_data: Self::ExtraData,
    ) -> IngestionResult<Self::Entries>;

    /// Stores the entries. Storing the same entries twice leaves the store unchanged.
    async fn store_event<W: DatabaseWriteOperations>(
        &self,
        entries: Self::Entries,
        db: &W,
    ) -> IngestionResult<()>;
}

/// Converts an event value to a u64.
pub(crate) fn to_u64(field: &'static str, value: U256) -> IngestionResult<u64> {
    value.try_into().map_err(|_| IngestionError::ValueOverflow { field, value })
}

/// Checks the batch continues the stored batches of its kind, given the stored batch at the
/// preceding index and the last stored batch. An empty store accepts any batch.
pub(crate) fn check_follows(
    kind: &'static str,
    batch: &BatchEntry,
    previous: Option<&BatchEntry>,
    latest: Option<&BatchEntry>,
) -> IngestionResult<()> {
    let Some(latest) = latest else { return Ok(()) };
    // A batch at or below the latest index is a rerun and only needs to follow its predecessor.
    let expected = if batch.index > latest.index { Some(latest) } else { previous };
    match expected {
        Some(expected) if !expected.is_followed_by(batch) => Err(IngestionError::BatchGap {
            kind,
            index: batch.index,
            prev_total_elements: batch.prev_total_elements,
            expected_index: expected.index.saturating_add(1),
            expected: expected.total_elements(),
        }),
        _ => Ok(()),
    }
}
