use alloy_primitives::B256;
use dtl_primitives::StateRootEntry;
use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that represents a committed state root.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "state_root")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    index: i64,
    batch_index: i64,
    value: Vec<u8>,
}

/// The relation for the state root model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the state root model.
impl ActiveModelBehavior for ActiveModel {}

impl From<StateRootEntry> for ActiveModel {
    fn from(value: StateRootEntry) -> Self {
        Self {
            index: ActiveValue::Set(value.index as i64),
            batch_index: ActiveValue::Set(value.batch_index as i64),
            value: ActiveValue::Set(value.value.to_vec()),
        }
    }
}

impl From<Model> for StateRootEntry {
    fn from(value: Model) -> Self {
        Self {
            index: value.index as u64,
            batch_index: value.batch_index as u64,
            value: B256::from_slice(&value.value),
        }
    }
}
