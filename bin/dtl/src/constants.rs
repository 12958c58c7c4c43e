/// The maximum amount of retries of a single L1 RPC request.
pub(crate) const L1_PROVIDER_MAX_RETRIES: u32 = 10;

/// The initial backoff in milliseconds of a retried L1 RPC request.
pub(crate) const L1_PROVIDER_INITIAL_BACKOFF: u64 = 100;

/// The compute units per second granted to the L1 provider.
pub(crate) const PROVIDER_COMPUTE_UNITS_PER_SECOND: u64 = 10000;

/// The default database path.
pub(crate) const DEFAULT_DB_PATH: &str = "./db/dtl.db";
