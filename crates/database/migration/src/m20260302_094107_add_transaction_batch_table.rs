use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TransactionBatch::Table)
                    .if_not_exists()
                    .col(big_integer(TransactionBatch::Index).primary_key())
                    .col(binary_len(TransactionBatch::Root, 32))
                    .col(big_integer(TransactionBatch::Size))
                    .col(big_integer(TransactionBatch::PrevTotalElements))
                    .col(blob(TransactionBatch::ExtraData))
                    .col(big_integer(TransactionBatch::BlockNumber))
                    .col(big_integer(TransactionBatch::Timestamp))
                    .col(binary_len(TransactionBatch::Submitter, 20))
                    .col(binary_len(TransactionBatch::L1TransactionHash, 32))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TransactionBatch::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum TransactionBatch {
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
