use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StateRootBatch::Table)
                    .if_not_exists()
                    .col(big_integer(StateRootBatch::Index).primary_key())
                    .col(binary_len(StateRootBatch::Root, 32))
                    .col(big_integer(StateRootBatch::Size))
                    .col(big_integer(StateRootBatch::PrevTotalElements))
                    .col(blob(StateRootBatch::ExtraData))
                    .col(big_integer(StateRootBatch::BlockNumber))
                    .col(big_integer(StateRootBatch::Timestamp))
                    .col(binary_len(StateRootBatch::Submitter, 20))
                    .col(binary_len(StateRootBatch::L1TransactionHash, 32))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StateRoot::Table)
                    .if_not_exists()
                    .col(big_integer(StateRoot::Index).primary_key())
                    .col(big_integer(StateRoot::BatchIndex))
                    .col(binary_len(StateRoot::Value, 32))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(StateRoot::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(StateRootBatch::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum StateRootBatch {
    Table,
    Index,
    Root,
    Size,
    PrevTotalElements,
    ExtraData,
    BlockNumber,
    Timestamp,
    Submitter,
    L1TransactionHash,
}

#[derive(DeriveIden)]
pub enum StateRoot {
    Table,
    Index,
    BatchIndex,
    Value,
}
