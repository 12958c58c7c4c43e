use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(QueueIndex::Table)
                    .if_not_exists()
                    .col(big_integer(QueueIndex::QueueIndex).primary_key())
                    .col(big_integer(QueueIndex::TransactionIndex))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(QueueIndex::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum QueueIndex {
    Table,
    QueueIndex,
    TransactionIndex,
}
