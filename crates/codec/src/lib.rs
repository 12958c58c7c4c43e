//! The codec for the calldata of the rollup batch submissions.
//!
//! Sequencer batches are submitted to `appendSequencerBatch()` in a custom compact encoding
//! following the function selector. State batches are plain ABI encoded calls to
//! `appendStateBatch(bytes32[],uint256)`. Each sequencer transaction carries its own embedded
//! encoding, prefixed by a type byte.

pub use error::{CodecError, DecodingError, EncodingError};
mod error;

mod macros;

pub use sequencer_batch::{
    decode_sequencer_batch, encode_sequencer_batch, BatchContext, SequencerBatch,
    SEQUENCER_BATCH_HEADER_LENGTH,
};
mod sequencer_batch;

pub use state_batch::{decode_state_batch, encode_state_batch};
mod state_batch;

pub use transaction::{
    decode_transaction, encode_transaction, validate_batch_transaction, MaybeDecodedTransaction,
    TRANSACTION_MIN_LENGTH,
};
mod transaction;

/// Tests utils.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
