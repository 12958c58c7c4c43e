use super::{to_u64, EventHandler, EventKind, ObservedEvent};
use crate::{client::L1Client, IngestionResult};

use dtl_db::DatabaseWriteOperations;
use dtl_l1::abi::logs::TransactionEnqueued;
use dtl_primitives::EnqueueEntry;

/// The handler of the `TransactionEnqueued` events. The enqueue is mapped as is, the block number
/// is read from the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnqueueHandler;

#[async_trait::async_trait]
impl EventHandler for EnqueueHandler {
    type Event = TransactionEnqueued;
    type ExtraData = ();
    type Entries = EnqueueEntry;

    const KIND: EventKind = EventKind::TransactionEnqueued;

    async fn get_extra_data<C: L1Client>(
        &self,
        _event: &ObservedEvent<Self::Event>,
        _client: &C,
    ) -> IngestionResult<Self::ExtraData> {
        Ok(())
    }

    fn parse_event(
        &self,
        event: &ObservedEvent<Self::Event>,
        _extra_data: Self::ExtraData,
    ) -> IngestionResult<Self::Entries> {
        let enqueued = &event.event;
        Ok(EnqueueEntry {
            index: to_u64("queueIndex", enqueued.queueIndex)?,
            target: enqueued.target,
            data: enqueued.data.clone(),
            gas_limit: to_u64("gasLimit", enqueued.gasLimit)?,
            origin: enqueued.l1TxOrigin,
            block_number: event.block_number,
            timestamp: to_u64("timestamp", enqueued.timestamp)?,
            ctc_index: None,
        })
    }

    async fn store_event<W: DatabaseWriteOperations>(
        &self,
        entries: Self::Entries,
        db: &W,
    ) -> IngestionResult<()> {
        tracing::trace!(target: "dtl::handlers", queue_index = entries.index, "storing enqueue");
        Ok(db.insert_enqueue(entries).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use alloy_primitives::{address, bytes, B256, U256};
    use dtl_db::{test_utils::setup_test_db, DatabaseReadOperations};

    fn observed() -> ObservedEvent<TransactionEnqueued> {
        ObservedEvent {
            event: TransactionEnqueued {
                l1TxOrigin: address!("0x6a8fa9e3d0eb6d6e86a1b4b4a49eb5e0e1f58a31"),
                target: address!("0x4200000000000000000000000000000000000007"),
                gasLimit: U256::from(1_500_000),
                data: bytes!("cafe"),
                queueIndex: U256::from(5),
                timestamp: U256::from(1_612_000_000),
            },
            address: address!("0x4bf681894abec828b212c906082b444ceb2f6cf6"),
            block_number: 11_650_012,
            transaction_hash: B256::with_last_byte(1),
            log_index: 3,
        }
    }

    #[tokio::test]
    async fn test_should_parse_and_store_enqueue() -> eyre::Result<()> {
        // Given
        let db = setup_test_db().await;
        let handler = EnqueueHandler;
        let event = observed();

        // When
        let entry = handler.parse_event(&event, ())?;
        let tx = db.tx_mut().await?;
        handler.store_event(entry.clone(), &tx).await?;
        tx.commit().await?;

        // Then
        assert_eq!(entry.index, 5);
        assert_eq!(entry.block_number, 11_650_012);
        assert_eq!(entry.timestamp, 1_612_000_000);
        assert_eq!(entry.origin, event.event.l1TxOrigin);
        assert_eq!(db.get_enqueue_by_index(5).await?, Some(entry));

        Ok(())
    }

    #[test]
    fn test_should_reject_overflowing_queue_index() {
        let mut event = observed();
        event.event.queueIndex = U256::MAX;

        assert!(EnqueueHandler.parse_event(&event, ()).is_err());
    }
}
