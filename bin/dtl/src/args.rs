use crate::constants;
use std::{path::PathBuf, time::Duration};

use alloy_primitives::Address;
use dtl_primitives::{IngestionConfig, DEFAULT_MAX_LOGS_PER_RANGE, DEFAULT_MAX_RANGE_RETRIES};

/// The arguments of the data transport layer.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "dtl", about = "Indexes the rollup ledger from the L1 contracts")]
pub(crate) struct DataTransportLayerArgs {
    /// The path of the sqlite database, or a full `sqlite:` url.
    #[arg(long = "db-path", env = "DATA_TRANSPORT_LAYER__DB_PATH", default_value = constants::DEFAULT_DB_PATH)]
    pub(crate) db_path: PathBuf,
    /// The L1 provider arguments.
    #[command(flatten)]
    pub(crate) l1_provider_args: L1ProviderArgs,
    /// The ingestion arguments.
    #[command(flatten)]
    pub(crate) ingestion_args: IngestionArgs,
}

impl DataTransportLayerArgs {
    /// Returns the url of the database, creating the file if missing.
    pub(crate) fn database_url(&self) -> String {
        let path = self.db_path.to_string_lossy();
        if path.starts_with("sqlite:") {
            return path.into_owned()
        }
        format!("sqlite://{path}?mode=rwc")
    }
}

/// The arguments for the L1 provider.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct L1ProviderArgs {
    /// The URL for the L1 RPC.
    #[arg(long = "l1.url", id = "l1_url", value_name = "L1_URL", env = "DATA_TRANSPORT_LAYER__L1_RPC_ENDPOINT")]
    pub(crate) url: reqwest::Url,
    /// The compute units per second for the provider.
    #[arg(long = "l1.cups", id = "l1_compute_units_per_second", value_name = "L1_COMPUTE_UNITS_PER_SECOND", default_value_t = constants::PROVIDER_COMPUTE_UNITS_PER_SECOND)]
    pub(crate) compute_units_per_second: u64,
    /// The max amount of retries for the provider.
    #[arg(long = "l1.max-retries", id = "l1_max_retries", value_name = "L1_MAX_RETRIES", default_value_t = constants::L1_PROVIDER_MAX_RETRIES)]
    pub(crate) max_retries: u32,
    /// The initial backoff for the provider.
    #[arg(long = "l1.initial-backoff", id = "l1_initial_backoff", value_name = "L1_INITIAL_BACKOFF", default_value_t = constants::L1_PROVIDER_INITIAL_BACKOFF)]
    pub(crate) initial_backoff: u64,
}

/// The arguments of the ingestion loop.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct IngestionArgs {
    /// The address of the address registry.
    #[arg(long = "address-manager", env = "DATA_TRANSPORT_LAYER__ADDRESS_MANAGER")]
    pub(crate) address_manager: Address,
    /// The first L1 block to sync when the database holds no cursor.
    #[arg(long = "l1-start-height", env = "DATA_TRANSPORT_LAYER__L1_START_HEIGHT", default_value_t = 0)]
    pub(crate) start_l1_block: u64,
    /// The amount of blocks behind the L1 head considered safe.
    #[arg(long, env = "DATA_TRANSPORT_LAYER__CONFIRMATIONS", default_value_t = 0)]
    pub(crate) confirmations: u64,
    /// The polling interval in milliseconds once synced.
    #[arg(long = "polling-interval", env = "DATA_TRANSPORT_LAYER__POLLING_INTERVAL", default_value_t = 5_000)]
    pub(crate) polling_interval_ms: u64,
    /// The maximum amount of blocks scanned per range.
    #[arg(long = "logs-per-polling-interval", env = "DATA_TRANSPORT_LAYER__LOGS_PER_POLLING_INTERVAL", default_value_t = dtl_primitives::DEFAULT_LOG_QUERY_BLOCK_RANGE)]
    pub(crate) log_query_block_range: u64,
    /// The maximum amount of logs per range, above which the range is halved.
    #[arg(long = "max-logs-per-range", default_value_t = DEFAULT_MAX_LOGS_PER_RANGE)]
    pub(crate) max_logs_per_range: usize,
    /// The maximum retries of a range before the failure is fatal.
    #[arg(long = "max-range-retries", default_value_t = DEFAULT_MAX_RANGE_RETRIES)]
    pub(crate) max_range_retries: usize,
    /// The initial backoff in milliseconds between retries of a range.
    #[arg(long = "range-retry-backoff", default_value_t = 500)]
    pub(crate) retry_backoff_ms: u64,
    /// Retry every failure instead of stopping on invalid L1 data.
    #[arg(long = "dangerously-catch-all-errors", env = "DATA_TRANSPORT_LAYER__DANGEROUSLY_CATCH_ALL_ERRORS", default_value_t = false)]
    pub(crate) tolerant: bool,
}

impl From<IngestionArgs> for IngestionConfig {
    fn from(args: IngestionArgs) -> Self {
        Self {
            address_manager: args.address_manager,
            start_l1_block: args.start_l1_block,
            confirmations: args.confirmations,
            polling_interval: Duration::from_millis(args.polling_interval_ms),
            log_query_block_range: args.log_query_block_range.max(1),
            max_logs_per_range: args.max_logs_per_range.max(1),
            tolerant: args.tolerant,
            max_range_retries: args.max_range_retries,
            retry_backoff: Duration::from_millis(args.retry_backoff_ms),
        }
    }
}
