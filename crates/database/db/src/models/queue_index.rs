use sea_orm::{entity::prelude::*, ActiveValue};

/// A database model that maps the queue index of an enqueued transaction to the global index it
/// was included at.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "queue_index")]
pub struct Model {
    /// The index of the enqueued transaction in the queue.
    #[sea_orm(primary_key, auto_increment = false)]
    pub queue_index: i64,
    /// The global index of the ledger transaction which includes it.
    pub transaction_index: i64,
}

/// The relation for the queue index model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the queue index model.
impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// Returns the [`ActiveModel`] mapping the queue index to the transaction index.
    pub fn new(queue_index: u64, transaction_index: u64) -> Self {
        Self {
            queue_index: ActiveValue::Set(queue_index as i64),
            transaction_index: ActiveValue::Set(transaction_index as i64),
        }
    }
}
