use alloy_primitives::Bytes;

/// An error occurring during the codec process.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The sequencer batch calldata could not be decoded.
    #[error("sequencer batch calldata {calldata} is invalid for decoding: {error}")]
    SequencerBatch {
        /// The raw calldata.
        calldata: Bytes,
        /// The decoding error.
        #[source]
        error: DecodingError,
    },
    /// The state batch calldata could not be decoded.
    #[error("state batch calldata {calldata} is invalid for decoding: {error}")]
    StateBatch {
        /// The raw calldata.
        calldata: Bytes,
        /// The ABI decoding error.
        #[source]
        error: alloy_sol_types::Error,
    },
    /// An error occurring at the encoding stage.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// An error occurring during the decoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodingError {
    /// The calldata ends before the fixed size header.
    #[error("calldata of length {length} is shorter than the {minimum} bytes header")]
    CalldataTooShort {
        /// The length of the calldata.
        length: usize,
        /// The size of the header.
        minimum: usize,
    },
    /// The calldata does not start with the `appendSequencerBatch` selector.
    #[error("unexpected function selector 0x{}", alloy_primitives::hex::encode(.0))]
    UnexpectedSelector([u8; 4]),
    /// The calldata ends in the middle of a field.
    #[error("end of file")]
    Eof,
}

/// An error occurring during the encoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EncodingError {
    /// The value exceeds the width of its field.
    #[error("value {value} of field {field} does not fit in {bytes} bytes")]
    FieldOverflow {
        /// The name of the field.
        field: &'static str,
        /// The value to encode.
        value: u64,
        /// The width of the field in bytes.
        bytes: usize,
    },
    /// The contexts do not account for the transactions.
    #[error("batch contexts sequence {expected} transactions, got {actual}")]
    TransactionCountMismatch {
        /// The count of sequenced transactions in the contexts.
        expected: usize,
        /// The count of transactions.
        actual: usize,
    },
}
