use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    tracing::info!(target: "dtl::migration", "Running database migrations.");
    cli::run_cli(dtl_migration::Migrator).await;
    tracing::info!(target: "dtl::migration", "Database migrations complete.")
}
