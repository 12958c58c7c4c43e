//! Primitive types for the data transport layer.

pub use batch::{BatchEntry, StateRootBatchEntry, TransactionBatchEntry};
mod batch;

pub use config::{
    IngestionConfig, DEFAULT_LOG_QUERY_BLOCK_RANGE, DEFAULT_MAX_LOGS_PER_RANGE,
    DEFAULT_MAX_RANGE_RETRIES,
};
mod config;

pub use enqueue::EnqueueEntry;
mod enqueue;

pub use error::PrimitiveError;
mod error;

pub use metadata::MetadataKey;
mod metadata;

pub use state_root::StateRootEntry;
mod state_root;

pub use transaction::{
    DecodedTransaction, QueueOrigin, Signature, TransactionEntry, TransactionType,
};
mod transaction;
