use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LedgerTransaction::Table)
                    .if_not_exists()
                    .col(big_integer(LedgerTransaction::Index).primary_key())
                    .col(big_integer(LedgerTransaction::BatchIndex))
                    .col(big_integer(LedgerTransaction::BlockNumber))
                    .col(big_integer(LedgerTransaction::Timestamp))
                    .col(big_integer(LedgerTransaction::GasLimit))
                    .col(binary_len(LedgerTransaction::Target, 20))
                    .col(binary_len_null(LedgerTransaction::Origin, 20))
                    .col(blob(LedgerTransaction::Data))
                    .col(string(LedgerTransaction::QueueOrigin))
                    .col(string_null(LedgerTransaction::TxType))
                    .col(big_integer_null(LedgerTransaction::QueueIndex))
                    .col(text_null(LedgerTransaction::Decoded))
                    .col(boolean(LedgerTransaction::Confirmed))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(LedgerTransaction::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum LedgerTransaction {
    Table,
    Index,
    BatchIndex,
    BlockNumber,
    Timestamp,
    GasLimit,
    Target,
    Origin,
    Data,
    QueueOrigin,
    TxType,
    QueueIndex,
    Decoded,
    Confirmed,
}
