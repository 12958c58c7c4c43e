use super::{
    m20260302_091533_add_ledger_transaction_table::LedgerTransaction,
    m20260303_101245_add_state_root_tables::StateRoot,
};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create indexes for the `ledger_transaction` table.
        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_transaction_queue_index")
                    .col(LedgerTransaction::QueueIndex)
                    .table(LedgerTransaction::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_transaction_batch_index")
                    .col(LedgerTransaction::BatchIndex)
                    .table(LedgerTransaction::Table)
                    .to_owned(),
            )
            .await?;

        // Create indexes for the `state_root` table.
        manager
            .create_index(
                Index::create()
                    .name("idx_state_root_batch_index")
                    .col(StateRoot::BatchIndex)
                    .table(StateRoot::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_ledger_transaction_queue_index")
                    .table(LedgerTransaction::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_ledger_transaction_batch_index")
                    .table(LedgerTransaction::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop().name("idx_state_root_batch_index").table(StateRoot::Table).to_owned(),
            )
            .await?;

        Ok(())
    }
}
