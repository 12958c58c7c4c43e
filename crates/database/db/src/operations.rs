use super::{models, DatabaseResult, ReadConnectionProvider, WriteConnectionProvider};
use crate::DatabaseError;

use dtl_primitives::{
    EnqueueEntry, MetadataKey, StateRootBatchEntry, StateRootEntry, TransactionBatchEntry,
    TransactionEntry,
};
use sea_orm::{sea_query::OnConflict, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

/// The maximum count of rows inserted in a single statement.
const MAX_ROWS_PER_INSERT: usize = 256;

/// The [`DatabaseReadOperations`] trait provides the lookups of the store. Lookups for missing
/// records return [`None`] or an empty [`Vec`].
#[async_trait::async_trait]
pub trait DatabaseReadOperations: ReadConnectionProvider {
    /// Get an [`EnqueueEntry`] by its queue index. The `ctc_index` is set if a sequencer batch
    /// included the enqueued transaction.
    async fn get_enqueue_by_index(&self, index: u64) -> DatabaseResult<Option<EnqueueEntry>> {
        let Some(enqueue) = models::enqueue::Entity::find_by_id(index as i64)
            .one(self.get_connection())
            .await?
        else {
            return Ok(None)
        };
        let mut enqueue: EnqueueEntry = enqueue.into();
        enqueue.ctc_index = self.get_transaction_index_by_queue_index(enqueue.index).await?;
        Ok(Some(enqueue))
    }

    /// Get the [`EnqueueEntry`] with the highest queue index.
    async fn get_latest_enqueue(&self) -> DatabaseResult<Option<EnqueueEntry>> {
        let Some(enqueue) = models::enqueue::Entity::find()
            .order_by_desc(models::enqueue::Column::Index)
            .one(self.get_connection())
            .await?
        else {
            return Ok(None)
        };
        let mut enqueue: EnqueueEntry = enqueue.into();
        enqueue.ctc_index = self.get_transaction_index_by_queue_index(enqueue.index).await?;
        Ok(Some(enqueue))
    }

    /// Get a [`TransactionEntry`] by its global index.
    async fn get_transaction_by_index(
        &self,
        index: u64,
    ) -> DatabaseResult<Option<TransactionEntry>> {
        models::ledger_transaction::Entity::find_by_id(index as i64)
            .one(self.get_connection())
            .await?
            .map(TransactionEntry::try_from)
            .transpose()
    }

    /// Get the [`TransactionEntry`] which included the enqueued transaction at the provided
    /// queue index.
    async fn get_transaction_by_queue_index(
        &self,
        queue_index: u64,
    ) -> DatabaseResult<Option<TransactionEntry>> {
        match self.get_transaction_index_by_queue_index(queue_index).await? {
            Some(index) => self.get_transaction_by_index(index).await,
            None => Ok(None),
        }
    }

    /// Get the [`TransactionEntry`]s in the `[start, end)` range of global indices, ordered by
    /// index.
    async fn get_transactions_by_index_range(
        &self,
        start: u64,
        end: u64,
    ) -> DatabaseResult<Vec<TransactionEntry>> {
        models::ledger_transaction::Entity::find()
            .filter(models::ledger_transaction::Column::Index.gte(start as i64))
            .filter(models::ledger_transaction::Column::Index.lt(end as i64))
            .order_by_asc(models::ledger_transaction::Column::Index)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(TransactionEntry::try_from)
            .collect()
    }

    /// Get the [`TransactionEntry`] with the highest global index.
    async fn get_latest_transaction(&self) -> DatabaseResult<Option<TransactionEntry>> {
        models::ledger_transaction::Entity::find()
            .order_by_desc(models::ledger_transaction::Column::Index)
            .one(self.get_connection())
            .await?
            .map(TransactionEntry::try_from)
            .transpose()
    }

    /// Get a [`TransactionBatchEntry`] by its batch index.
    async fn get_transaction_batch_by_index(
        &self,
        index: u64,
    ) -> DatabaseResult<Option<TransactionBatchEntry>> {
        Ok(models::transaction_batch::Entity::find_by_id(index as i64)
            .one(self.get_connection())
            .await
            .map(|x| x.map(Into::into))?)
    }

    /// Get the [`TransactionBatchEntry`] with the highest batch index.
    async fn get_latest_transaction_batch(&self) -> DatabaseResult<Option<TransactionBatchEntry>> {
        Ok(models::transaction_batch::Entity::find()
            .order_by_desc(models::transaction_batch::Column::Index)
            .one(self.get_connection())
            .await
            .map(|x| x.map(Into::into))?)
    }

    /// Get a [`StateRootEntry`] by its global index.
    async fn get_state_root_by_index(&self, index: u64) -> DatabaseResult<Option<StateRootEntry>> {
        Ok(models::state_root::Entity::find_by_id(index as i64)
            .one(self.get_connection())
            .await
            .map(|x| x.map(Into::into))?)
    }

    /// Get the [`StateRootEntry`]s in the `[start, end)` range of global indices, ordered by
    /// index.
    async fn get_state_roots_by_index_range(
        &self,
        start: u64,
        end: u64,
    ) -> DatabaseResult<Vec<StateRootEntry>> {
        Ok(models::state_root::Entity::find()
            .filter(models::state_root::Column::Index.gte(start as i64))
            .filter(models::state_root::Column::Index.lt(end as i64))
            .order_by_asc(models::state_root::Column::Index)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Get the [`StateRootEntry`] with the highest global index.
    async fn get_latest_state_root(&self) -> DatabaseResult<Option<StateRootEntry>> {
        Ok(models::state_root::Entity::find()
            .order_by_desc(models::state_root::Column::Index)
            .one(self.get_connection())
            .await
            .map(|x| x.map(Into::into))?)
    }

    /// Get a [`StateRootBatchEntry`] by its batch index.
    async fn get_state_root_batch_by_index(
        &self,
        index: u64,
    ) -> DatabaseResult<Option<StateRootBatchEntry>> {
        Ok(models::state_root_batch::Entity::find_by_id(index as i64)
            .one(self.get_connection())
            .await
            .map(|x| x.map(Into::into))?)
    }

    /// Get the [`StateRootBatchEntry`] with the highest batch index.
    async fn get_latest_state_root_batch(&self) -> DatabaseResult<Option<StateRootBatchEntry>> {
        Ok(models::state_root_batch::Entity::find()
            .order_by_desc(models::state_root_batch::Column::Index)
            .one(self.get_connection())
            .await
            .map(|x| x.map(Into::into))?)
    }

    /// Get the global index the enqueued transaction at the provided queue index was included
    /// at.
    async fn get_transaction_index_by_queue_index(
        &self,
        queue_index: u64,
    ) -> DatabaseResult<Option<u64>> {
        Ok(models::queue_index::Entity::find_by_id(queue_index as i64)
            .one(self.get_connection())
            .await
            .map(|x| x.map(|x| x.transaction_index as u64))?)
    }

    /// Get the highest L1 block fully synced.
    async fn get_synced_l1_block(&self) -> DatabaseResult<Option<u64>> {
        get_metadata(self.get_connection(), MetadataKey::SyncedL1Block).await
    }

    /// Get the L2 chain id.
    async fn get_l2_chain_id(&self) -> DatabaseResult<Option<u64>> {
        get_metadata(self.get_connection(), MetadataKey::L2ChainId).await
    }
}

impl<T> DatabaseReadOperations for T where T: ReadConnectionProvider + ?Sized {}

/// The [`DatabaseWriteOperations`] trait provides the writes of the store. All writes are upserts
/// keyed by index, such that writing the same entries twice leaves the store unchanged.
#[async_trait::async_trait]
pub trait DatabaseWriteOperations: WriteConnectionProvider + DatabaseReadOperations {
    /// Insert an [`EnqueueEntry`] into the database. If a sequencer batch already included the
    /// transaction as a placeholder, the placeholder is filled from the enqueue.
    async fn insert_enqueue(&self, enqueue: EnqueueEntry) -> DatabaseResult<()> {
        tracing::trace!(target: "dtl::db", queue_index = enqueue.index, "Inserting enqueue into database.");
        let model: models::enqueue::ActiveModel = enqueue.clone().into();
        models::enqueue::Entity::insert(model)
            .on_conflict(
                OnConflict::column(models::enqueue::Column::Index)
                    .update_columns([
                        models::enqueue::Column::Target,
                        models::enqueue::Column::Data,
                        models::enqueue::Column::GasLimit,
                        models::enqueue::Column::Origin,
                        models::enqueue::Column::BlockNumber,
                        models::enqueue::Column::Timestamp,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.get_connection())
            .await?;

        if let Some(mut transaction) = self.get_transaction_by_queue_index(enqueue.index).await? {
            if transaction.is_placeholder() {
                tracing::trace!(target: "dtl::db", queue_index = enqueue.index, index = transaction.index, "Filling placeholder transaction from enqueue.");
                transaction.reconcile(&enqueue);
                upsert_transaction(self.get_connection(), transaction).await?;
            }
        }

        Ok(())
    }

    /// Insert the [`TransactionEntry`]s into the database.
    ///
    /// An L1 origin placeholder is filled from the stored enqueue with the same queue index. If
    /// no such enqueue exists and a complete entry is already stored at the index, the stored
    /// entry is kept.
    async fn insert_transactions(&self, transactions: Vec<TransactionEntry>) -> DatabaseResult<()> {
        tracing::trace!(target: "dtl::db", count = transactions.len(), "Inserting transactions into database.");
        for mut transaction in transactions {
            if transaction.is_placeholder() {
                if let Some(queue_index) = transaction.queue_index {
                    if let Some(enqueue) = models::enqueue::Entity::find_by_id(queue_index as i64)
                        .one(self.get_connection())
                        .await?
                    {
                        transaction.reconcile(&enqueue.into());
                    }
                }
            }

            if transaction.is_placeholder() {
                let stored = self.get_transaction_by_index(transaction.index).await?;
                if stored.is_some_and(|stored| !stored.is_placeholder()) {
                    tracing::trace!(target: "dtl::db", index = transaction.index, "Keeping stored transaction over placeholder.");
                    continue
                }
            }

            upsert_transaction(self.get_connection(), transaction).await?;
        }
        Ok(())
    }

    /// Insert the mapping of the queue index to the global index the enqueued transaction was
    /// included at.
    async fn insert_queue_index_mapping(
        &self,
        queue_index: u64,
        transaction_index: u64,
    ) -> DatabaseResult<()> {
        tracing::trace!(target: "dtl::db", queue_index, transaction_index, "Inserting queue index mapping into database.");
        models::queue_index::Entity::insert(models::queue_index::ActiveModel::new(
            queue_index,
            transaction_index,
        ))
        .on_conflict(
            OnConflict::column(models::queue_index::Column::QueueIndex)
                .update_column(models::queue_index::Column::TransactionIndex)
                .to_owned(),
        )
        .exec_without_returning(self.get_connection())
        .await?;
        Ok(())
    }

    /// Insert a [`TransactionBatchEntry`] into the database.
    async fn insert_transaction_batch(&self, batch: TransactionBatchEntry) -> DatabaseResult<()> {
        tracing::trace!(target: "dtl::db", batch_index = batch.index, "Inserting transaction batch into database.");
        let model: models::transaction_batch::ActiveModel = batch.into();
        models::transaction_batch::Entity::insert(model)
            .on_conflict(
                OnConflict::column(models::transaction_batch::Column::Index)
                    .update_columns([
                        models::transaction_batch::Column::Root,
                        models::transaction_batch::Column::Size,
                        models::transaction_batch::Column::PrevTotalElements,
                        models::transaction_batch::Column::ExtraData,
                        models::transaction_batch::Column::BlockNumber,
                        models::transaction_batch::Column::Timestamp,
                        models::transaction_batch::Column::Submitter,
                        models::transaction_batch::Column::L1TransactionHash,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.get_connection())
            .await?;
        Ok(())
    }

    /// Insert a [`StateRootBatchEntry`] into the database.
    async fn insert_state_root_batch(&self, batch: StateRootBatchEntry) -> DatabaseResult<()> {
        tracing::trace!(target: "dtl::db", batch_index = batch.index, "Inserting state root batch into database.");
        let model: models::state_root_batch::ActiveModel = batch.into();
        models::state_root_batch::Entity::insert(model)
            .on_conflict(
                OnConflict::column(models::state_root_batch::Column::Index)
                    .update_columns([
                        models::state_root_batch::Column::Root,
                        models::state_root_batch::Column::Size,
                        models::state_root_batch::Column::PrevTotalElements,
                        models::state_root_batch::Column::ExtraData,
                        models::state_root_batch::Column::BlockNumber,
                        models::state_root_batch::Column::Timestamp,
                        models::state_root_batch::Column::Submitter,
                        models::state_root_batch::Column::L1TransactionHash,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.get_connection())
            .await?;
        Ok(())
    }

    /// Insert the [`StateRootEntry`]s into the database.
    async fn insert_state_roots(&self, state_roots: Vec<StateRootEntry>) -> DatabaseResult<()> {
        tracing::trace!(target: "dtl::db", count = state_roots.len(), "Inserting state roots into database.");
        for chunk in state_roots.chunks(MAX_ROWS_PER_INSERT) {
            models::state_root::Entity::insert_many(
                chunk.iter().cloned().map(models::state_root::ActiveModel::from),
            )
            .on_conflict(
                OnConflict::column(models::state_root::Column::Index)
                    .update_columns([
                        models::state_root::Column::BatchIndex,
                        models::state_root::Column::Value,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.get_connection())
            .await?;
        }
        Ok(())
    }

    /// Set the highest L1 block fully synced.
    async fn set_synced_l1_block(&self, block_number: u64) -> DatabaseResult<()> {
        tracing::trace!(target: "dtl::db", block_number, "Setting synced L1 block.");
        set_metadata(self.get_connection(), MetadataKey::SyncedL1Block, block_number).await
    }

    /// Set the L2 chain id.
    async fn set_l2_chain_id(&self, chain_id: u64) -> DatabaseResult<()> {
        tracing::trace!(target: "dtl::db", chain_id, "Setting L2 chain id.");
        set_metadata(self.get_connection(), MetadataKey::L2ChainId, chain_id).await
    }
}

impl<T> DatabaseWriteOperations for T where T: WriteConnectionProvider + ?Sized {}

async fn upsert_transaction<C: ConnectionTrait>(
    connection: &C,
    transaction: TransactionEntry,
) -> DatabaseResult<()> {
    let model: models::ledger_transaction::ActiveModel = transaction.try_into()?;
    models::ledger_transaction::Entity::insert(model)
        .on_conflict(
            OnConflict::column(models::ledger_transaction::Column::Index)
                .update_columns([
                    models::ledger_transaction::Column::BatchIndex,
                    models::ledger_transaction::Column::BlockNumber,
                    models::ledger_transaction::Column::Timestamp,
                    models::ledger_transaction::Column::GasLimit,
                    models::ledger_transaction::Column::Target,
                    models::ledger_transaction::Column::Origin,
                    models::ledger_transaction::Column::Data,
                    models::ledger_transaction::Column::QueueOrigin,
                    models::ledger_transaction::Column::TxType,
                    models::ledger_transaction::Column::QueueIndex,
                    models::ledger_transaction::Column::Decoded,
                    models::ledger_transaction::Column::Confirmed,
                ])
                .to_owned(),
        )
        .exec_without_returning(connection)
        .await?;
    Ok(())
}

async fn get_metadata<C: ConnectionTrait>(
    connection: &C,
    key: MetadataKey,
) -> DatabaseResult<Option<u64>> {
    let Some(model) =
        models::metadata::Entity::find_by_id(key.as_str().to_owned()).one(connection).await?
    else {
        return Ok(None)
    };
    model
        .value
        .parse()
        .map(Some)
        .map_err(|_| DatabaseError::InvalidMetadata { key: key.as_str(), value: model.value })
}

async fn set_metadata<C: ConnectionTrait>(
    connection: &C,
    key: MetadataKey,
    value: u64,
) -> DatabaseResult<()> {
    models::metadata::Entity::insert(models::metadata::ActiveModel::new(key, value))
        .on_conflict(
            OnConflict::column(models::metadata::Column::Key)
                .update_column(models::metadata::Column::Value)
                .to_owned(),
        )
        .exec_without_returning(connection)
        .await?;
    Ok(())
}
