use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Enqueue::Table)
                    .if_not_exists()
                    .col(big_integer(Enqueue::Index).primary_key())
                    .col(binary_len(Enqueue::Target, 20))
                    .col(blob(Enqueue::Data))
                    .col(big_integer(Enqueue::GasLimit))
                    .col(binary_len(Enqueue::Origin, 20))
                    .col(big_integer(Enqueue::BlockNumber))
                    .col(big_integer(Enqueue::Timestamp))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Enqueue::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Enqueue {
    Table,
    Index,
    Target,
    Data,
    GasLimit,
    Origin,
    BlockNumber,
    Timestamp,
}
