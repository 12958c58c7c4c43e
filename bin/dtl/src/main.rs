//! The data transport layer: indexes the rollup ledger from the L1 contracts into a local store.

use alloy_provider::ProviderBuilder;
use alloy_rpc_client::RpcClient;
use alloy_transport::layers::RetryBackoffLayer;
use clap::Parser;
use dtl_db::{Database, DatabaseConnectionProvider};
use dtl_ingestion::L1Ingestion;
use dtl_migration::{Migrator, MigratorTrait};
use dtl_primitives::IngestionConfig;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;
use args::{DataTransportLayerArgs, L1ProviderArgs};

mod constants;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = DataTransportLayerArgs::parse();
    tracing::info!(target: "dtl::cli", ?args, "Starting data transport layer");

    // Open the store and bring the schema up to date.
    let db = Database::new(&args.database_url()).await?;
    Migrator::up(db.get_connection(), None).await?;
    let db = Arc::new(db);

    let L1ProviderArgs { url, max_retries, initial_backoff, compute_units_per_second } =
        args.l1_provider_args;
    let client = RpcClient::builder()
        .layer(RetryBackoffLayer::new(max_retries, initial_backoff, compute_units_per_second))
        .http(url);
    let provider = ProviderBuilder::new().connect_client(client);

    let config: IngestionConfig = args.ingestion_args.into();
    let mut ingestion = L1Ingestion::new(provider, db, config);
    if let Err(err) = ingestion.run().await {
        tracing::error!(target: "dtl::cli", ?err, cursor = ?ingestion.cursor(), "Ingestion stopped");
        return Err(err.into())
    }

    Ok(())
}
