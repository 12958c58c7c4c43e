use super::{
    metrics::DatabaseMetrics, transaction::TXMut, DatabaseConnectionProvider, DatabaseError,
    ReadConnectionProvider,
};

use sea_orm::{Database as SeaOrmDatabase, DatabaseConnection, TransactionTrait};
use std::{sync::Arc, time::Instant};
use tokio::sync::Mutex;

/// The [`Database`] struct is responsible for interacting with the database.
///
/// The [`Database`] type wraps a [`sea_orm::DatabaseConnection`]. It implements
/// [`ReadConnectionProvider`] such that it can be used to perform the operations defined in
/// [`crate::DatabaseReadOperations`]. Writes are performed atomically through the [`TXMut`]
/// returned by [`Database::tx_mut`], which also implements [`crate::DatabaseWriteOperations`].
/// A write lock ensures a single [`TXMut`] is open at any time.
#[derive(Clone)]
pub struct Database {
    /// The underlying database connection.
    connection: DatabaseConnection,
    /// The write lock.
    write_lock: Arc<Mutex<()>>,
    /// The database metrics.
    metrics: DatabaseMetrics,
}

impl Database {
    /// Creates a new [`Database`] instance associated with the provided database URL.
    pub async fn new(database_url: &str) -> Result<Self, DatabaseError> {
        tracing::info!(target: "dtl::db", database_url, "Connecting to database");
        let connection = SeaOrmDatabase::connect(database_url).await?;
        Ok(connection.into())
    }

    /// Creates a new [`TXMut`] which can be used for atomic read and write operations. Waits for
    /// any open [`TXMut`] to be committed or rolled back.
    pub async fn tx_mut(&self) -> Result<TXMut, DatabaseError> {
        let now = Instant::now();
        let guard = self.write_lock.clone().lock_owned().await;
        self.metrics.write_lock_acquire_duration.record(now.elapsed().as_millis() as f64);

        let tx = self.connection.begin().await?;
        Ok(TXMut::new(tx, guard))
    }
}

impl DatabaseConnectionProvider for Database {
    type Connection = DatabaseConnection;

    fn get_connection(&self) -> &Self::Connection {
        &self.connection
    }
}

impl ReadConnectionProvider for Database {}

impl From<DatabaseConnection> for Database {
    fn from(connection: DatabaseConnection) -> Self {
        Self {
            connection,
            write_lock: Arc::new(Mutex::new(())),
            metrics: DatabaseMetrics::default(),
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("connection", &self.connection).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use crate::{test_utils::setup_test_db, DatabaseReadOperations, DatabaseWriteOperations};

    use alloy_primitives::{address, b256, bytes, Address, Bytes, B256};
    use arbitrary::{Arbitrary, Unstructured};
    use dtl_primitives::{
        BatchEntry, EnqueueEntry, QueueOrigin, StateRootEntry, TransactionEntry, TransactionType,
    };
    use rand::Rng;

    fn enqueue(index: u64) -> EnqueueEntry {
        EnqueueEntry {
            index,
            target: address!("0x00000000000000000000000000000000000000aa"),
            data: bytes!("c0ffee"),
            gas_limit: 500_000,
            origin: address!("0x00000000000000000000000000000000000000bb"),
            block_number: 12_000 + index,
            timestamp: 1_700_000_000 + index,
            ctc_index: None,
        }
    }

    fn placeholder(index: u64, queue_index: u64) -> TransactionEntry {
        TransactionEntry {
            index,
            batch_index: 0,
            block_number: 0,
            timestamp: 0,
            gas_limit: 0,
            target: Address::ZERO,
            origin: Some(Address::ZERO),
            data: Bytes::new(),
            queue_origin: QueueOrigin::L1,
            tx_type: Some(TransactionType::Eip155),
            queue_index: Some(queue_index),
            decoded: None,
            confirmed: true,
        }
    }

    fn sequencer_transaction(index: u64) -> TransactionEntry {
        TransactionEntry {
            index,
            batch_index: 0,
            block_number: 10,
            timestamp: 20,
            gas_limit: 8_000_000,
            target: Address::with_last_byte(5),
            origin: None,
            data: bytes!("01"),
            queue_origin: QueueOrigin::Sequencer,
            tx_type: None,
            queue_index: None,
            decoded: None,
            confirmed: true,
        }
    }

    fn batch(index: u64, prev_total_elements: u64, size: u64) -> BatchEntry {
        BatchEntry {
            index,
            root: B256::repeat_byte(index as u8),
            size,
            prev_total_elements,
            extra_data: Bytes::new(),
            block_number: 100 + index,
            timestamp: 1_000 + index,
            submitter: Address::with_last_byte(1),
            l1_transaction_hash: b256!(
                "0x1111111111111111111111111111111111111111111111111111111111111111"
            ),
        }
    }

    #[tokio::test]
    async fn test_database_round_trip_enqueue() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;

        // Generate unstructured bytes.
        let mut bytes = [0u8; 1024];
        rand::rng().fill(bytes.as_mut_slice());
        let mut u = Unstructured::new(&bytes);

        // Generate a random enqueue, the ctc index is not stored with it.
        let mut enqueue = EnqueueEntry::arbitrary(&mut u)?;
        enqueue.ctc_index = None;

        // Round trip the enqueue through the database.
        let tx = db.tx_mut().await?;
        tx.insert_enqueue(enqueue.clone()).await?;
        tx.commit().await?;

        assert_eq!(db.get_enqueue_by_index(enqueue.index).await?, Some(enqueue));

        Ok(())
    }

    #[tokio::test]
    async fn test_database_round_trip_transaction() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;

        // Generate unstructured bytes.
        let mut bytes = [0u8; 2048];
        rand::rng().fill(bytes.as_mut_slice());
        let mut u = Unstructured::new(&bytes);

        // Generate a random transaction.
        let transaction = TransactionEntry::arbitrary(&mut u)?;

        // Round trip the transaction through the database, including its decoded payload.
        let tx = db.tx_mut().await?;
        tx.insert_transactions(vec![transaction.clone()]).await?;
        tx.commit().await?;

        assert_eq!(db.get_transaction_by_index(transaction.index).await?, Some(transaction));

        Ok(())
    }

    #[tokio::test]
    async fn test_database_rollback() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;

        // Write a batch and its transactions, then roll back.
        let tx = db.tx_mut().await?;
        tx.insert_transaction_batch(batch(0, 0, 2)).await?;
        tx.insert_transactions(vec![sequencer_transaction(0), sequencer_transaction(1)]).await?;
        tx.rollback().await?;

        // Nothing is visible.
        assert_eq!(db.get_latest_transaction_batch().await?, None);
        assert!(db.get_transactions_by_index_range(0, 2).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_database_upserts_are_idempotent() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;

        // Write the same batch twice.
        for _ in 0..2 {
            let tx = db.tx_mut().await?;
            tx.insert_state_root_batch(batch(0, 0, 3)).await?;
            tx.insert_state_roots(
                (0..3)
                    .map(|index| StateRootEntry {
                        index,
                        batch_index: 0,
                        value: B256::with_last_byte(index as u8),
                    })
                    .collect(),
            )
            .await?;
            tx.commit().await?;
        }

        assert_eq!(db.get_latest_state_root_batch().await?, Some(batch(0, 0, 3)));
        assert_eq!(db.get_state_root_batch_by_index(1).await?, None);
        let roots = db.get_state_roots_by_index_range(0, 10).await?;
        assert_eq!(roots.iter().map(|r| r.index).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(db.get_latest_state_root().await?.map(|r| r.index), Some(2));
        assert_eq!(db.get_state_root_by_index(3).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_database_range_is_half_open() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;

        let tx = db.tx_mut().await?;
        tx.insert_transactions((0..5).map(sequencer_transaction).collect()).await?;
        tx.commit().await?;

        let range = db.get_transactions_by_index_range(1, 4).await?;
        assert_eq!(range.iter().map(|t| t.index).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(db.get_transactions_by_index_range(5, 10).await?.is_empty());
        assert_eq!(db.get_latest_transaction().await?.map(|t| t.index), Some(4));

        Ok(())
    }

    #[tokio::test]
    async fn test_database_fills_placeholder_from_stored_enqueue() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;

        // Given an enqueue stored before the batch including it.
        let tx = db.tx_mut().await?;
        tx.insert_enqueue(enqueue(0)).await?;
        tx.commit().await?;

        // When the batch writes a placeholder for it.
        let tx = db.tx_mut().await?;
        tx.insert_transactions(vec![sequencer_transaction(0), placeholder(1, 0)]).await?;
        tx.insert_queue_index_mapping(0, 1).await?;
        tx.commit().await?;

        // Then the stored transaction carries the enqueue fields.
        let transaction = db.get_transaction_by_queue_index(0).await?.expect("transaction");
        assert_eq!(transaction.index, 1);
        assert_eq!(transaction.block_number, 12_000);
        assert_eq!(transaction.timestamp, 1_700_000_000);
        assert_eq!(transaction.gas_limit, 500_000);
        assert_eq!(transaction.target, enqueue(0).target);
        assert_eq!(transaction.origin, Some(enqueue(0).origin));
        assert_eq!(transaction.data, enqueue(0).data);
        assert_eq!(transaction.queue_origin, QueueOrigin::L1);
        assert_eq!(db.get_enqueue_by_index(0).await?.and_then(|e| e.ctc_index), Some(1));

        Ok(())
    }

    #[tokio::test]
    async fn test_database_back_fills_placeholder_on_enqueue() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;

        // Given a placeholder stored before its enqueue.
        let tx = db.tx_mut().await?;
        tx.insert_transactions(vec![placeholder(0, 0)]).await?;
        tx.insert_queue_index_mapping(0, 0).await?;
        tx.commit().await?;
        assert!(db.get_transaction_by_index(0).await?.expect("transaction").is_placeholder());

        // When the enqueue is stored.
        let tx = db.tx_mut().await?;
        tx.insert_enqueue(enqueue(0)).await?;
        tx.commit().await?;

        // Then the placeholder is filled.
        let transaction = db.get_transaction_by_index(0).await?.expect("transaction");
        assert!(!transaction.is_placeholder());
        assert_eq!(transaction.block_number, 12_000);
        assert_eq!(transaction.data, enqueue(0).data);

        Ok(())
    }

    #[tokio::test]
    async fn test_database_keeps_complete_transaction_over_placeholder() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;

        // Given a complete L1 origin transaction.
        let mut complete = placeholder(0, 7);
        complete.reconcile(&enqueue(7));
        let tx = db.tx_mut().await?;
        tx.insert_transactions(vec![complete.clone()]).await?;
        tx.commit().await?;

        // When a placeholder for the same index is written without a stored enqueue.
        let tx = db.tx_mut().await?;
        tx.insert_transactions(vec![placeholder(0, 7)]).await?;
        tx.commit().await?;

        // Then the complete transaction is kept.
        assert_eq!(db.get_transaction_by_index(0).await?, Some(complete));

        Ok(())
    }

    #[tokio::test]
    async fn test_database_metadata() -> eyre::Result<()> {
        // Set up the test database.
        let db = setup_test_db().await;
        assert_eq!(db.get_synced_l1_block().await?, None);
        assert_eq!(db.get_l2_chain_id().await?, None);

        let tx = db.tx_mut().await?;
        tx.set_synced_l1_block(10).await?;
        tx.set_synced_l1_block(20).await?;
        tx.set_l2_chain_id(420).await?;
        tx.commit().await?;

        assert_eq!(db.get_synced_l1_block().await?, Some(20));
        assert_eq!(db.get_l2_chain_id().await?, Some(420));
        assert_eq!(db.get_latest_enqueue().await?, None);
        assert_eq!(db.get_transaction_index_by_queue_index(0).await?, None);

        Ok(())
    }
}
