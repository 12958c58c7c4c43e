use crate::DatabaseError;

use alloy_primitives::Address;
use dtl_primitives::{QueueOrigin, TransactionEntry, TransactionType};
use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents a transaction of the canonical transaction chain.
///
/// The decoded sequencer transaction is stored as JSON.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_transaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    index: i64,
    batch_index: i64,
    block_number: i64,
    timestamp: i64,
    gas_limit: i64,
    target: Vec<u8>,
    origin: Option<Vec<u8>>,
    data: Vec<u8>,
    queue_origin: String,
    tx_type: Option<String>,
    queue_index: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    decoded: Option<String>,
    confirmed: bool,
}

/// The relation for the ledger transaction model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the ledger transaction model.
impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<TransactionEntry> for ActiveModel {
    type Error = DatabaseError;

    fn try_from(value: TransactionEntry) -> Result<Self, Self::Error> {
        let decoded = value.decoded.as_ref().map(serde_json::to_string).transpose()?;
        Ok(Self {
            index: ActiveValue::Set(value.index as i64),
            batch_index: ActiveValue::Set(value.batch_index as i64),
            block_number: ActiveValue::Set(value.block_number as i64),
            timestamp: ActiveValue::Set(value.timestamp as i64),
            gas_limit: ActiveValue::Set(value.gas_limit as i64),
            target: ActiveValue::Set(value.target.to_vec()),
            origin: ActiveValue::Set(value.origin.map(|origin| origin.to_vec())),
            data: ActiveValue::Set(value.data.to_vec()),
            queue_origin: ActiveValue::Set(value.queue_origin.as_str().to_owned()),
            tx_type: ActiveValue::Set(value.tx_type.map(|ty| ty.as_str().to_owned())),
            queue_index: ActiveValue::Set(value.queue_index.map(|index| index as i64)),
            decoded: ActiveValue::Set(decoded),
            confirmed: ActiveValue::Set(value.confirmed),
        })
    }
}

impl TryFrom<Model> for TransactionEntry {
    type Error = DatabaseError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            index: value.index as u64,
            batch_index: value.batch_index as u64,
            block_number: value.block_number as u64,
            timestamp: value.timestamp as u64,
            gas_limit: value.gas_limit as u64,
            target: Address::from_slice(&value.target),
            origin: value.origin.as_deref().map(Address::from_slice),
            data: value.data.into(),
            queue_origin: QueueOrigin::try_from(value.queue_origin.as_str())?,
            tx_type: value.tx_type.as_deref().map(TransactionType::try_from).transpose()?,
            queue_index: value.queue_index.map(|index| index as u64),
            decoded: value.decoded.as_deref().map(serde_json::from_str).transpose()?,
            confirmed: value.confirmed,
        })
    }
}
