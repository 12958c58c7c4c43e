use super::{check_follows, to_u64, EventHandler, EventKind, ObservedEvent};
use crate::{
    client::{L1Client, LogQuery},
    EthRequestError, IngestionError, IngestionResult,
};

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolEvent;
use dtl_codec::{decode_sequencer_batch, decode_transaction, MaybeDecodedTransaction};
use dtl_db::{DatabaseReadOperations, DatabaseWriteOperations};
use dtl_l1::{
    abi::logs::{SequencerBatchAppended, TransactionBatchAppended},
    SEQUENCER_ENTRYPOINT_ADDRESS, SEQUENCER_GAS_LIMIT,
};
use dtl_primitives::{QueueOrigin, TransactionBatchEntry, TransactionEntry, TransactionType};

/// The data fetched from the L1 to parse a `SequencerBatchAppended` event.
#[derive(Debug)]
pub struct SequencerBatchExtraData {
    /// The L1 block of the submission.
    pub block_number: u64,
    /// The timestamp of the L1 block of the submission.
    pub timestamp: u64,
    /// The sender of the submission transaction.
    pub submitter: Address,
    /// The hash of the submission transaction.
    pub l1_transaction_hash: B256,
    /// The calldata of the submission transaction.
    pub calldata: Bytes,
    /// The gas limit of the sequencer transactions.
    pub gas_limit: u64,
    /// The companion `TransactionBatchAppended` event.
    pub batch: TransactionBatchAppended,
}

/// The entries of a sequencer batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerBatchEntries {
    /// The batch.
    pub batch: TransactionBatchEntry,
    /// The transactions of the batch, sequencer and queue, in order.
    pub transactions: Vec<TransactionEntry>,
}

/// The handler of the `SequencerBatchAppended` events.
///
/// The batch is described by the `TransactionBatchAppended` event emitted just before, in the
/// same transaction. Its transactions are decoded from the calldata of the submission. Queue
/// transactions are not part of the calldata and are stored as placeholders, filled from the
/// stored enqueue of the same queue index.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequencerBatchHandler;

#[async_trait::async_trait]
impl EventHandler for SequencerBatchHandler {
    type Event = SequencerBatchAppended;
    type ExtraData = SequencerBatchExtraData;
    type Entries = SequencerBatchEntries;

    const KIND: EventKind = EventKind::SequencerBatchAppended;

    async fn get_extra_data<C: L1Client>(
        &self,
        event: &ObservedEvent<Self::Event>,
        client: &C,
    ) -> IngestionResult<Self::ExtraData> {
        let missing_companion = || IngestionError::MissingCompanionEvent {
            block_number: event.block_number,
            transaction_hash: event.transaction_hash,
        };
        let companion_index = event.log_index.checked_sub(1).ok_or_else(missing_companion)?;
        let query = LogQuery {
            addresses: vec![event.address],
            event_signature: TransactionBatchAppended::SIGNATURE_HASH,
            from_block: event.block_number,
            to_block: event.block_number,
        };

        let (block, transaction, logs) = tokio::try_join!(
            client.block(event.block_number),
            client.transaction(event.transaction_hash),
            client.logs(&query)
        )?;
        let block = block.ok_or(EthRequestError::MissingBlock(event.block_number))?;
        let transaction =
            transaction.ok_or(EthRequestError::MissingTransactionHash(event.transaction_hash))?;

        let companion = logs
            .iter()
            .find(|log| {
                log.transaction_hash == Some(event.transaction_hash) &&
                    log.log_index == Some(companion_index)
            })
            .ok_or_else(missing_companion)?;
        let batch = ObservedEvent::<TransactionBatchAppended>::try_from_log(companion)?.event;

        Ok(SequencerBatchExtraData {
            block_number: block.number,
            timestamp: block.timestamp,
            submitter: transaction.from,
            l1_transaction_hash: transaction.hash,
            calldata: transaction.input,
            gas_limit: SEQUENCER_GAS_LIMIT,
            batch,
        })
    }

    fn parse_event(
        &self,
        event: &ObservedEvent<Self::Event>,
        extra_data: Self::ExtraData,
    ) -> IngestionResult<Self::Entries> {
        let decoded = decode_sequencer_batch(&extra_data.calldata).map_err(|source| {
            IngestionError::BatchDecoding { block_number: extra_data.block_number, source }
        })?;

        let batch = TransactionBatchEntry {
            index: to_u64("batchIndex", extra_data.batch.batchIndex)?,
            root: extra_data.batch.batchRoot,
            size: to_u64("batchSize", extra_data.batch.batchSize)?,
            prev_total_elements: to_u64(
                "prevTotalElements",
                extra_data.batch.prevTotalElements,
            )?,
            extra_data: extra_data.batch.extraData,
            block_number: extra_data.block_number,
            timestamp: extra_data.timestamp,
            submitter: extra_data.submitter,
            l1_transaction_hash: extra_data.l1_transaction_hash,
        };
        let starting_queue_index =
            to_u64("startingQueueIndex", event.event.startingQueueIndex)?;
        let (sequenced, queued) = decoded.contexts.iter().fold((0u64, 0u64), |(s, q), context| {
            (s + context.num_sequenced_transactions, q + context.num_subsequent_queue_transactions)
        });
        to_u64(
            "totalElements",
            U256::from(batch.prev_total_elements) + U256::from(sequenced) + U256::from(queued),
        )?;
        to_u64("queueIndex", U256::from(starting_queue_index) + U256::from(queued))?;

        let mut transactions = Vec::with_capacity(decoded.transactions.len());
        let mut raw_transactions = decoded.transactions.into_iter();
        let mut sequencer_count = 0u64;
        let mut queue_count = 0u64;

        for context in &decoded.contexts {
            for data in raw_transactions.by_ref().take(context.num_sequenced_transactions as usize)
            {
                let MaybeDecodedTransaction { decoded, tx_type } = decode_transaction(&data);
                transactions.push(TransactionEntry {
                    index: batch.prev_total_elements + sequencer_count + queue_count,
                    batch_index: batch.index,
                    block_number: context.block_number,
                    timestamp: context.timestamp,
                    gas_limit: extra_data.gas_limit,
                    target: SEQUENCER_ENTRYPOINT_ADDRESS,
                    origin: None,
                    data,
                    queue_origin: QueueOrigin::Sequencer,
                    tx_type,
                    queue_index: None,
                    decoded,
                    confirmed: true,
                });
                sequencer_count += 1;
            }

            for _ in 0..context.num_subsequent_queue_transactions {
                transactions.push(TransactionEntry {
                    index: batch.prev_total_elements + sequencer_count + queue_count,
                    batch_index: batch.index,
                    block_number: 0,
                    timestamp: 0,
                    gas_limit: 0,
                    target: Address::ZERO,
                    origin: Some(Address::ZERO),
                    data: Bytes::new(),
                    queue_origin: QueueOrigin::L1,
                    tx_type: Some(TransactionType::Eip155),
                    queue_index: Some(starting_queue_index + queue_count),
                    decoded: None,
                    confirmed: true,
                });
                queue_count += 1;
            }
        }

        tracing::trace!(
            target: "dtl::handlers",
            batch_index = batch.index,
            sequencer_count,
            queue_count,
            "parsed sequencer batch"
        );

        Ok(SequencerBatchEntries { batch, transactions })
    }

    async fn store_event<W: DatabaseWriteOperations>(
        &self,
        entries: Self::Entries,
        db: &W,
    ) -> IngestionResult<()> {
        let SequencerBatchEntries { batch, transactions } = entries;

        let previous = match batch.index.checked_sub(1) {
            Some(previous_index) => db.get_transaction_batch_by_index(previous_index).await?,
            None => None,
        };
        let latest = db.get_latest_transaction_batch().await?;
        check_follows("transaction", &batch, previous.as_ref(), latest.as_ref())?;

        let mappings: Vec<_> = transactions
            .iter()
            .filter_map(|tx| tx.queue_index.map(|queue_index| (queue_index, tx.index)))
            .collect();

        tracing::trace!(target: "dtl::handlers", batch_index = batch.index, count = transactions.len(), "storing sequencer batch");
        db.insert_transaction_batch(batch).await?;
        db.insert_transactions(transactions).await?;
        for (queue_index, index) in mappings {
            db.insert_queue_index_mapping(queue_index, index).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use alloy_primitives::{bytes, U256};
    use dtl_codec::test_utils::{sample_batch, SAMPLE_BATCH_SIZE};
    use dtl_db::test_utils::setup_test_db;

    const BLOCK_NUMBER: u64 = 11_702_000;

    fn observed(starting_queue_index: u64) -> ObservedEvent<SequencerBatchAppended> {
        ObservedEvent {
            event: SequencerBatchAppended {
                startingQueueIndex: U256::from(starting_queue_index),
                numQueueElements: U256::from(3),
                totalElements: U256::from(SAMPLE_BATCH_SIZE),
            },
            address: Address::with_last_byte(0xcc),
            block_number: BLOCK_NUMBER,
            transaction_hash: B256::with_last_byte(0x11),
            log_index: 1,
        }
    }

    fn extra_data(
        calldata: Bytes,
        batch_index: u64,
        prev_total_elements: u64,
        size: u64,
    ) -> SequencerBatchExtraData {
        SequencerBatchExtraData {
            block_number: BLOCK_NUMBER,
            timestamp: 1_610_100_000,
            submitter: Address::with_last_byte(0x5e),
            l1_transaction_hash: B256::with_last_byte(0x11),
            calldata,
            gas_limit: SEQUENCER_GAS_LIMIT,
            batch: TransactionBatchAppended {
                batchIndex: U256::from(batch_index),
                batchRoot: B256::repeat_byte(0xbb),
                batchSize: U256::from(size),
                prevTotalElements: U256::from(prev_total_elements),
                extraData: Bytes::new(),
            },
        }
    }

    #[test]
    fn test_should_parse_sample_batch() -> eyre::Result<()> {
        // Given
        let (calldata, batch, transactions) = sample_batch();
        let extra = extra_data(calldata, 0, 0, SAMPLE_BATCH_SIZE as u64);

        // When
        let entries = SequencerBatchHandler.parse_event(&observed(7), extra)?;

        // Then
        assert_eq!(entries.transactions.len(), SAMPLE_BATCH_SIZE);
        let sequencer =
            entries.transactions.iter().filter(|tx| tx.queue_origin == QueueOrigin::Sequencer);
        for (entry, expected) in sequencer.zip(transactions.iter()) {
            let decoded = entry.decoded.as_ref().expect("sample transactions are valid");
            assert_eq!(decoded.target, expected.target);
            assert_eq!(decoded.data, expected.data);
            assert_eq!(decoded.nonce, expected.nonce);
            assert_eq!(decoded.gas_limit, expected.gas_limit);
            assert_eq!(decoded.gas_price, expected.gas_price);
            assert_eq!(entry.tx_type, Some(expected.tx_type));
            assert_eq!(entry.target, SEQUENCER_ENTRYPOINT_ADDRESS);
            assert_eq!(entry.gas_limit, SEQUENCER_GAS_LIMIT);
            assert_eq!(entry.origin, None);
        }

        for (i, entry) in entries.transactions.iter().enumerate() {
            assert_eq!(entry.index, i as u64);
            assert_eq!(entry.batch_index, 0);
        }

        // The queue transactions close the first, third and fifth contexts.
        let queue: Vec<_> = entries
            .transactions
            .iter()
            .filter(|tx| tx.queue_origin == QueueOrigin::L1)
            .map(|tx| (tx.index, tx.queue_index))
            .collect();
        assert_eq!(queue, vec![(20, Some(7)), (60, Some(8)), (100, Some(9))]);
        assert!(entries.transactions.iter().filter(|tx| tx.queue_index.is_some()).all(|tx| {
            tx.is_placeholder() && tx.decoded.is_none() && tx.origin == Some(Address::ZERO)
        }));

        let first_context = batch.contexts[0];
        assert_eq!(entries.transactions[0].block_number, first_context.block_number);
        assert_eq!(entries.transactions[0].timestamp, first_context.timestamp);
        assert_eq!(entries.batch.submitter, Address::with_last_byte(0x5e));
        assert_eq!(entries.batch.total_elements(), SAMPLE_BATCH_SIZE as u64);

        Ok(())
    }

    #[test]
    fn test_should_offset_indices_by_previous_elements() -> eyre::Result<()> {
        let (calldata, ..) = sample_batch();
        let extra = extra_data(calldata, 3, 250, SAMPLE_BATCH_SIZE as u64);

        let entries = SequencerBatchHandler.parse_event(&observed(0), extra)?;

        assert_eq!(entries.transactions.first().map(|tx| tx.index), Some(250));
        assert_eq!(entries.transactions.last().map(|tx| tx.index), Some(350));
        assert!(entries.transactions.iter().all(|tx| tx.batch_index == 3));

        Ok(())
    }

    #[test]
    fn test_should_name_block_on_short_calldata() {
        let calldata = bytes!("d0f893440000");
        let extra = extra_data(calldata, 0, 0, 0);

        let err = SequencerBatchHandler.parse_event(&observed(0), extra).unwrap_err();

        assert!(matches!(err, IngestionError::BatchDecoding { block_number: BLOCK_NUMBER, .. }));
        let message = err.to_string();
        assert!(message.contains(&BLOCK_NUMBER.to_string()));
        assert!(message.contains("0xd0f893440000"));
    }

    #[tokio::test]
    async fn test_should_reject_batch_gap() -> eyre::Result<()> {
        // Given
        let db = setup_test_db().await;
        let (calldata, ..) = sample_batch();
        let first = SequencerBatchHandler
            .parse_event(&observed(0), extra_data(calldata.clone(), 0, 0, 101))?;
        let gap = SequencerBatchHandler
            .parse_event(&observed(3), extra_data(calldata, 1, 150, 101))?;

        // When
        let tx = db.tx_mut().await?;
        SequencerBatchHandler.store_event(first.clone(), &tx).await?;
        let result = SequencerBatchHandler.store_event(gap, &tx).await;
        tx.commit().await?;

        // Then
        assert!(matches!(
            result,
            Err(IngestionError::BatchGap { index: 1, prev_total_elements: 150, expected: 101, .. })
        ));
        assert_eq!(db.get_latest_transaction_batch().await?, Some(first.batch));
        assert_eq!(db.get_transaction_index_by_queue_index(2).await?, Some(100));

        Ok(())
    }

    #[tokio::test]
    async fn test_should_reject_batch_after_missing_batch() -> eyre::Result<()> {
        // Given
        let db = setup_test_db().await;
        let (calldata, ..) = sample_batch();
        let first = SequencerBatchHandler
            .parse_event(&observed(0), extra_data(calldata.clone(), 0, 0, 101))?;
        let skipped = SequencerBatchHandler
            .parse_event(&observed(3), extra_data(calldata, 2, 101, 101))?;

        // When
        let tx = db.tx_mut().await?;
        SequencerBatchHandler.store_event(first.clone(), &tx).await?;
        let result = SequencerBatchHandler.store_event(skipped, &tx).await;
        let rerun = SequencerBatchHandler.store_event(first, &tx).await;
        tx.rollback().await?;

        // Then
        assert!(matches!(
            result,
            Err(IngestionError::BatchGap { index: 2, expected_index: 1, expected: 101, .. })
        ));
        assert!(rerun.is_ok());

        Ok(())
    }

    #[test]
    fn test_should_reject_overflowing_transaction_indices() {
        let (calldata, ..) = sample_batch();

        let result =
            SequencerBatchHandler.parse_event(&observed(0), extra_data(calldata, 0, u64::MAX, 101));

        assert!(matches!(result, Err(IngestionError::ValueOverflow { field: "totalElements", .. })));
    }
}
