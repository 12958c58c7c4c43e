use alloy_json_rpc::RpcError;
use alloy_primitives::{B256, U256};
use alloy_transport::TransportErrorKind;
use dtl_codec::CodecError;
use dtl_db::DatabaseError;

/// A [`Result`] that uses [`IngestionError`] as the error type.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// An error that occurred during the ingestion.
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    /// A Provider error at the RPC level.
    #[error("execution provider rpc error: {0:?}")]
    ProviderRpc(#[from] RpcError<TransportErrorKind>),
    /// An Ethereum request error.
    #[error("failed Ethereum JSON RPC request: {0:?}")]
    EthRequest(#[from] EthRequestError),
    /// An error related to logs.
    #[error(transparent)]
    Logs(#[from] FilterLogError),
    /// The submitted batch calldata could not be decoded.
    #[error("block {block_number} transaction data is invalid for decoding: {source}")]
    BatchDecoding {
        /// The L1 block the batch was submitted at.
        block_number: u64,
        /// The codec error, carrying the raw calldata.
        #[source]
        source: CodecError,
    },
    /// The `TransactionBatchAppended` event preceding a `SequencerBatchAppended` event is missing.
    #[error(
        "missing TransactionBatchAppended companion event for transaction {transaction_hash} at block {block_number}"
    )]
    MissingCompanionEvent {
        /// The L1 block of the sequencer batch event.
        block_number: u64,
        /// The hash of the submission transaction.
        transaction_hash: B256,
    },
    /// The batch does not directly follow the stored batches.
    #[error(
        "{kind} batch {index} with {prev_total_elements} previous elements does not follow the stored batches, expected batch {expected_index} with {expected} previous elements"
    )]
    BatchGap {
        /// The kind of batch.
        kind: &'static str,
        /// The index of the batch.
        index: u64,
        /// The previous total elements of the batch.
        prev_total_elements: u64,
        /// The index of the batch expected next.
        expected_index: u64,
        /// The total elements after the stored batch it should follow.
        expected: u64,
    },
    /// An event value does not fit in 64 bits.
    #[error("value {value} of field {field} overflows u64")]
    ValueOverflow {
        /// The field name.
        field: &'static str,
        /// The value.
        value: U256,
    },
    /// A database error.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl IngestionError {
    /// Returns true if the error is a transport error, which is retried with backoff.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::ProviderRpc(_))
    }
}

/// An error occurred during a request to the Ethereum JSON RPC provider.
#[derive(Debug, thiserror::Error)]
pub enum EthRequestError {
    /// The requested block does not exist.
    #[error("unknown block {0}")]
    MissingBlock(u64),
    /// The requested transaction hash does not exist.
    #[error("unknown transaction {0}")]
    MissingTransactionHash(B256),
    /// The return data of a contract call could not be decoded.
    #[error("invalid return data for {method}: {error}")]
    InvalidReturnData {
        /// The called method.
        method: &'static str,
        /// The ABI decoding error.
        error: alloy_sol_types::Error,
    },
}

/// An error that occurred when filtering logs.
#[derive(Debug, thiserror::Error)]
pub enum FilterLogError {
    /// The log is missing a block number.
    #[error("missing block number for log")]
    MissingBlockNumber,
    /// The log is missing a transaction hash.
    #[error("unknown transaction hash for log")]
    MissingTransactionHash,
    /// The log is missing a log index.
    #[error("missing log index for log")]
    MissingLogIndex,
    /// The log could not be decoded.
    #[error("failed to decode log of type {log_type}: {error}")]
    DecodeLogFailed {
        /// The type of the log.
        log_type: &'static str,
        /// The ABI decoding error.
        error: alloy_sol_types::Error,
    },
}
