use super::{check_follows, to_u64, EventHandler, EventKind, ObservedEvent};
use crate::{client::L1Client, EthRequestError, IngestionError, IngestionResult};

use alloy_primitives::{Address, B256, U256};
use dtl_codec::decode_state_batch;
use dtl_db::{DatabaseReadOperations, DatabaseWriteOperations};
use dtl_l1::abi::logs::StateBatchAppended;
use dtl_primitives::{StateRootBatchEntry, StateRootEntry};

/// The data fetched from the L1 to parse a `StateBatchAppended` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateBatchExtraData {
    /// The L1 block of the submission.
    pub block_number: u64,
    /// The timestamp of the L1 block of the submission.
    pub timestamp: u64,
    /// The sender of the submission transaction.
    pub submitter: Address,
    /// The hash of the submission transaction.
    pub l1_transaction_hash: B256,
    /// The state roots decoded from the calldata of the submission transaction.
    pub state_roots: Vec<B256>,
}

/// The entries of a state batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateBatchEntries {
    /// The batch.
    pub batch: StateRootBatchEntry,
    /// The state roots of the batch, in order.
    pub state_roots: Vec<StateRootEntry>,
}

/// The handler of the `StateBatchAppended` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateBatchHandler;

#[async_trait::async_trait]
impl EventHandler for StateBatchHandler {
    type Event = StateBatchAppended;
    type ExtraData = StateBatchExtraData;
    type Entries = StateBatchEntries;

    const KIND: EventKind = EventKind::StateBatchAppended;

    async fn get_extra_data<C: L1Client>(
        &self,
        event: &ObservedEvent<Self::Event>,
        client: &C,
    ) -> IngestionResult<Self::ExtraData> {
        let (block, transaction) = tokio::try_join!(
            client.block(event.block_number),
            client.transaction(event.transaction_hash)
        )?;
        let block = block.ok_or(EthRequestError::MissingBlock(event.block_number))?;
        let transaction =
            transaction.ok_or(EthRequestError::MissingTransactionHash(event.transaction_hash))?;

        let state_roots = decode_state_batch(&transaction.input).map_err(|source| {
            IngestionError::BatchDecoding { block_number: block.number, source }
        })?;

        Ok(StateBatchExtraData {
            block_number: block.number,
            timestamp: block.timestamp,
            submitter: transaction.from,
            l1_transaction_hash: transaction.hash,
            state_roots,
        })
    }

    fn parse_event(
        &self,
        event: &ObservedEvent<Self::Event>,
        extra_data: Self::ExtraData,
    ) -> IngestionResult<Self::Entries> {
        let appended = &event.event;
        let batch = StateRootBatchEntry {
            index: to_u64("batchIndex", appended.batchIndex)?,
            root: appended.batchRoot,
            size: to_u64("batchSize", appended.batchSize)?,
            prev_total_elements: to_u64("prevTotalElements", appended.prevTotalElements)?,
            extra_data: appended.extraData.clone(),
            block_number: extra_data.block_number,
            timestamp: extra_data.timestamp,
            submitter: extra_data.submitter,
            l1_transaction_hash: extra_data.l1_transaction_hash,
        };
        to_u64(
            "totalElements",
            appended.prevTotalElements.saturating_add(U256::from(extra_data.state_roots.len())),
        )?;
        let state_roots = extra_data
            .state_roots
            .into_iter()
            .zip(batch.prev_total_elements..)
            .map(|(value, index)| StateRootEntry { index, batch_index: batch.index, value })
            .collect();

        Ok(StateBatchEntries { batch, state_roots })
    }

    async fn store_event<W: DatabaseWriteOperations>(
        &self,
        entries: Self::Entries,
        db: &W,
    ) -> IngestionResult<()> {
        let StateBatchEntries { batch, state_roots } = entries;

        let previous = match batch.index.checked_sub(1) {
            Some(previous_index) => db.get_state_root_batch_by_index(previous_index).await?,
            None => None,
        };
        let latest = db.get_latest_state_root_batch().await?;
        check_follows("state root", &batch, previous.as_ref(), latest.as_ref())?;

        tracing::trace!(target: "dtl::handlers", batch_index = batch.index, count = state_roots.len(), "storing state batch");
        db.insert_state_root_batch(batch).await?;
        db.insert_state_roots(state_roots).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use alloy_primitives::{Bytes, U256};
    use dtl_db::test_utils::setup_test_db;

    fn observed(
        batch_index: u64,
        prev_total_elements: u64,
        size: u64,
    ) -> ObservedEvent<StateBatchAppended> {
        ObservedEvent {
            event: StateBatchAppended {
                batchIndex: U256::from(batch_index),
                batchRoot: B256::repeat_byte(0x5b),
                batchSize: U256::from(size),
                prevTotalElements: U256::from(prev_total_elements),
                extraData: Bytes::new(),
            },
            address: Address::with_last_byte(0xdd),
            block_number: 11_702_010,
            transaction_hash: B256::with_last_byte(0x22),
            log_index: 0,
        }
    }

    fn extra_data(size: u64) -> StateBatchExtraData {
        StateBatchExtraData {
            block_number: 11_702_010,
            timestamp: 1_610_100_150,
            submitter: Address::with_last_byte(0x5f),
            l1_transaction_hash: B256::with_last_byte(0x22),
            state_roots: (0..size).map(|i| B256::with_last_byte(i as u8)).collect(),
        }
    }

    #[tokio::test]
    async fn test_should_parse_and_store_state_batches() -> eyre::Result<()> {
        // Given
        let db = setup_test_db().await;
        let first = StateBatchHandler.parse_event(&observed(0, 0, 4), extra_data(4))?;
        let second = StateBatchHandler.parse_event(&observed(1, 4, 3), extra_data(3))?;

        // When
        let tx = db.tx_mut().await?;
        StateBatchHandler.store_event(first, &tx).await?;
        StateBatchHandler.store_event(second.clone(), &tx).await?;
        tx.commit().await?;

        // Then
        let indices: Vec<_> = second.state_roots.iter().map(|root| root.index).collect();
        assert_eq!(indices, vec![4, 5, 6]);
        assert_eq!(db.get_latest_state_root_batch().await?, Some(second.batch));
        let latest = db.get_latest_state_root().await?.expect("state roots stored");
        assert_eq!((latest.index, latest.batch_index), (6, 1));
        assert_eq!(latest.value, B256::with_last_byte(2));

        Ok(())
    }

    #[tokio::test]
    async fn test_should_reject_state_batch_gap() -> eyre::Result<()> {
        let db = setup_test_db().await;
        let first = StateBatchHandler.parse_event(&observed(0, 0, 4), extra_data(4))?;
        let gap = StateBatchHandler.parse_event(&observed(1, 5, 3), extra_data(3))?;

        let tx = db.tx_mut().await?;
        StateBatchHandler.store_event(first, &tx).await?;
        let result = StateBatchHandler.store_event(gap, &tx).await;
        tx.rollback().await?;

        assert!(matches!(
            result,
            Err(IngestionError::BatchGap { kind: "state root", index: 1, expected: 4, .. })
        ));
        assert_eq!(db.get_latest_state_root_batch().await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_should_reject_state_batch_after_missing_batch() -> eyre::Result<()> {
        // Given
        let db = setup_test_db().await;
        let first = StateBatchHandler.parse_event(&observed(0, 0, 4), extra_data(4))?;
        let skipped = StateBatchHandler.parse_event(&observed(2, 4, 3), extra_data(3))?;

        // When
        let tx = db.tx_mut().await?;
        StateBatchHandler.store_event(first, &tx).await?;
        let result = StateBatchHandler.store_event(skipped, &tx).await;
        tx.rollback().await?;

        // Then
        assert!(matches!(
            result,
            Err(IngestionError::BatchGap { index: 2, expected_index: 1, expected: 4, .. })
        ));

        Ok(())
    }

    #[test]
    fn test_should_reject_overflowing_state_root_indices() {
        let result = StateBatchHandler.parse_event(&observed(0, u64::MAX, 2), extra_data(2));

        assert!(matches!(result, Err(IngestionError::ValueOverflow { field: "totalElements", .. })));
    }
}
