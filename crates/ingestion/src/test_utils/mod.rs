//! Test utils for the ingestion.

/// Test utils for arbitrary.
pub mod arbitrary;

pub use l1::{MockL1Client, GENESIS_TIMESTAMP};
mod l1;

use dtl_primitives::IngestionConfig;
use std::time::Duration;

/// Returns an [`IngestionConfig`] for the [`MockL1Client`] registry, without confirmations and
/// with short intervals.
pub fn test_config() -> IngestionConfig {
    IngestionConfig {
        confirmations: 0,
        polling_interval: Duration::from_millis(10),
        retry_backoff: Duration::from_millis(1),
        max_range_retries: 3,
        ..IngestionConfig::new(MockL1Client::ADDRESS_MANAGER)
    }
}
