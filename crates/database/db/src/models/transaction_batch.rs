use alloy_primitives::{Address, B256};
use dtl_primitives::TransactionBatchEntry;
use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents a sequencer batch submission.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transaction_batch")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    index: i64,
    root: Vec<u8>,
    size: i64,
    prev_total_elements: i64,
    extra_data: Vec<u8>,
    block_number: i64,
    timestamp: i64,
    submitter: Vec<u8>,
    l1_transaction_hash: Vec<u8>,
}

/// The relation for the sequencer batch submission model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the sequencer batch submission model.
impl ActiveModelBehavior for ActiveModel {}

impl From<TransactionBatchEntry> for ActiveModel {
    fn from(value: TransactionBatchEntry) -> Self {
        Self {
            index: ActiveValue::Set(value.index as i64),
            root: ActiveValue::Set(value.root.to_vec()),
            size: ActiveValue::Set(value.size as i64),
            prev_total_elements: ActiveValue::Set(value.prev_total_elements as i64),
            extra_data: ActiveValue::Set(value.extra_data.to_vec()),
            block_number: ActiveValue::Set(value.block_number as i64),
            timestamp: ActiveValue::Set(value.timestamp as i64),
            submitter: ActiveValue::Set(value.submitter.to_vec()),
            l1_transaction_hash: ActiveValue::Set(value.l1_transaction_hash.to_vec()),
        }
    }
}

impl From<Model> for TransactionBatchEntry {
    fn from(value: Model) -> Self {
        Self {
            index: value.index as u64,
            root: B256::from_slice(&value.root),
            size: value.size as u64,
            prev_total_elements: value.prev_total_elements as u64,
            extra_data: value.extra_data.into(),
            block_number: value.block_number as u64,
            timestamp: value.timestamp as u64,
            submitter: Address::from_slice(&value.submitter),
            l1_transaction_hash: B256::from_slice(&value.l1_transaction_hash),
        }
    }
}
