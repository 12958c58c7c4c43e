use alloy_primitives::Address;
use dtl_primitives::EnqueueEntry;
use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents a transaction enqueued on the L1.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "enqueue")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    index: i64,
    target: Vec<u8>,
    data: Vec<u8>,
    gas_limit: i64,
    origin: Vec<u8>,
    block_number: i64,
    timestamp: i64,
}

/// The relation for the enqueue model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the enqueue model.
impl ActiveModelBehavior for ActiveModel {}

impl From<EnqueueEntry> for ActiveModel {
    fn from(value: EnqueueEntry) -> Self {
        Self {
            index: ActiveValue::Set(value.index as i64),
            target: ActiveValue::Set(value.target.to_vec()),
            data: ActiveValue::Set(value.data.to_vec()),
            gas_limit: ActiveValue::Set(value.gas_limit as i64),
            origin: ActiveValue::Set(value.origin.to_vec()),
            block_number: ActiveValue::Set(value.block_number as i64),
            timestamp: ActiveValue::Set(value.timestamp as i64),
        }
    }
}

impl From<Model> for EnqueueEntry {
    fn from(value: Model) -> Self {
        Self {
            index: value.index as u64,
            target: Address::from_slice(&value.target),
            data: value.data.into(),
            gas_limit: value.gas_limit as u64,
            origin: Address::from_slice(&value.origin),
            block_number: value.block_number as u64,
            timestamp: value.timestamp as u64,
            ctc_index: None,
        }
    }
}
