pub use sea_orm_migration::prelude::*;

mod m20260302_090412_add_enqueue_table;
mod m20260302_091533_add_ledger_transaction_table;
mod m20260302_092240_add_queue_index_table;
mod m20260302_094107_add_transaction_batch_table;
mod m20260303_101245_add_state_root_tables;
mod m20260303_110020_add_metadata;
mod m20260310_141808_add_table_indexes;

/// The migrator for the data transport layer store.
#[derive(Debug)]
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260302_090412_add_enqueue_table::Migration),
            Box::new(m20260302_091533_add_ledger_transaction_table::Migration),
            Box::new(m20260302_092240_add_queue_index_table::Migration),
            Box::new(m20260302_094107_add_transaction_batch_table::Migration),
            Box::new(m20260303_101245_add_state_root_tables::Migration),
            Box::new(m20260303_110020_add_metadata::Migration),
            Box::new(m20260310_141808_add_table_indexes::Migration),
        ]
    }
}
