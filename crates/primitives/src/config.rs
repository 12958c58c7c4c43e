use alloy_primitives::Address;
use std::time::Duration;

/// The default number of blocks queried per range.
pub const DEFAULT_LOG_QUERY_BLOCK_RANGE: u64 = 2_000;

/// The default number of logs a single range may contain before it is halved.
pub const DEFAULT_MAX_LOGS_PER_RANGE: usize = 2_000;

/// The default retries of a failing range before escalating.
pub const DEFAULT_MAX_RANGE_RETRIES: usize = 10;

/// The configuration of the L1 ingestion.
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// The address of the address registry.
    pub address_manager: Address,
    /// The first L1 block to sync when no cursor is persisted.
    pub start_l1_block: u64,
    /// The depth behind the L1 head considered safe from reorgs.
    pub confirmations: u64,
    /// The sleep duration when the ingestion is synced to the safe head.
    pub polling_interval: Duration,
    /// The maximum number of blocks queried per range.
    pub log_query_block_range: u64,
    /// The maximum number of logs per range, above which the range is halved.
    pub max_logs_per_range: usize,
    /// Retry every failure instead of escalating non transport errors.
    pub tolerant: bool,
    /// The maximum retries of a single range before escalating.
    pub max_range_retries: usize,
    /// The initial backoff between retries of a range, doubled at each attempt.
    pub retry_backoff: Duration,
}

impl IngestionConfig {
    /// Returns a new [`IngestionConfig`] for the provided address registry with default values.
    pub const fn new(address_manager: Address) -> Self {
        Self {
            address_manager,
            start_l1_block: 0,
            confirmations: 0,
            polling_interval: Duration::from_secs(5),
            log_query_block_range: DEFAULT_LOG_QUERY_BLOCK_RANGE,
            max_logs_per_range: DEFAULT_MAX_LOGS_PER_RANGE,
            tolerant: false,
            max_range_retries: DEFAULT_MAX_RANGE_RETRIES,
            retry_backoff: Duration::from_millis(500),
        }
    }
}
