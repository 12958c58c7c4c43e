use crate::{
    from_be_bytes_slice_and_advance_buf, put_be_bytes_checked, CodecError, DecodingError,
    EncodingError,
};

use alloy_primitives::{bytes::Buf, Bytes};
use alloy_sol_types::SolCall;
use dtl_l1::abi::calls::appendSequencerBatchCall;

/// The length of the fixed header of the sequencer batch calldata: the function selector,
/// `shouldStartAtElement` (5 bytes), `totalElementsToAppend` (3 bytes) and the contexts count (3
/// bytes).
pub const SEQUENCER_BATCH_HEADER_LENGTH: usize = 15;

/// The length prefix of each sequencer transaction.
const TRANSACTION_LENGTH_PREFIX: usize = 3;

/// A context of a sequencer batch: a run of sequencer transactions sharing a block number and
/// timestamp, followed by a run of queue transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchContext {
    /// The count of sequencer transactions in the context.
    pub num_sequenced_transactions: u64,
    /// The count of queue transactions following the sequencer transactions.
    pub num_subsequent_queue_transactions: u64,
    /// The timestamp of the context.
    pub timestamp: u64,
    /// The block number of the context.
    pub block_number: u64,
}

impl BatchContext {
    /// The length of an encoded context.
    pub const BYTES_LENGTH: usize = 16;

    /// Tries to read from the input buffer into the [`BatchContext`].
    /// Returns [`None`] if the buffer.len() < [`BatchContext::BYTES_LENGTH`].
    fn try_from_buf(buf: &mut &[u8]) -> Option<Self> {
        if buf.len() < Self::BYTES_LENGTH {
            return None
        }

        let num_sequenced_transactions = from_be_bytes_slice_and_advance_buf!(u64, 3, buf);
        let num_subsequent_queue_transactions = from_be_bytes_slice_and_advance_buf!(u64, 3, buf);
        let timestamp = from_be_bytes_slice_and_advance_buf!(u64, 5, buf);
        let block_number = from_be_bytes_slice_and_advance_buf!(u64, 5, buf);

        Some(Self {
            num_sequenced_transactions,
            num_subsequent_queue_transactions,
            timestamp,
            block_number,
        })
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodingError> {
        put_be_bytes_checked!(buf, self.num_sequenced_transactions, 3, "numSequencedTransactions");
        put_be_bytes_checked!(
            buf,
            self.num_subsequent_queue_transactions,
            3,
            "numSubsequentQueueTransactions"
        );
        put_be_bytes_checked!(buf, self.timestamp, 5, "timestamp");
        put_be_bytes_checked!(buf, self.block_number, 5, "blockNumber");
        Ok(())
    }
}

/// A sequencer batch, as submitted to `appendSequencerBatch()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequencerBatch {
    /// The total elements the chain should hold before the batch is appended.
    pub should_start_at_element: u64,
    /// The number of elements, sequencer and queue, appended by the batch.
    pub total_elements_to_append: u64,
    /// The contexts of the batch.
    pub contexts: Vec<BatchContext>,
    /// The raw sequencer transactions of the batch, in order.
    pub transactions: Vec<Bytes>,
}

impl SequencerBatch {
    /// Returns the count of sequencer transactions declared by the contexts.
    pub fn sequenced_transactions_count(&self) -> usize {
        self.contexts.iter().map(|c| c.num_sequenced_transactions as usize).sum()
    }
}

/// Decodes the calldata of an `appendSequencerBatch()` call into a [`SequencerBatch`].
pub fn decode_sequencer_batch(calldata: &[u8]) -> Result<SequencerBatch, CodecError> {
    try_decode_sequencer_batch(calldata).map_err(|error| CodecError::SequencerBatch {
        calldata: Bytes::copy_from_slice(calldata),
        error,
    })
}

fn try_decode_sequencer_batch(calldata: &[u8]) -> Result<SequencerBatch, DecodingError> {
    if calldata.len() < SEQUENCER_BATCH_HEADER_LENGTH {
        return Err(DecodingError::CalldataTooShort {
            length: calldata.len(),
            minimum: SEQUENCER_BATCH_HEADER_LENGTH,
        })
    }

    let buf = &mut &calldata[..];

    let selector = from_be_bytes_slice_and_advance_buf!(u32, buf).to_be_bytes();
    if selector != appendSequencerBatchCall::SELECTOR {
        return Err(DecodingError::UnexpectedSelector(selector))
    }

    let should_start_at_element = from_be_bytes_slice_and_advance_buf!(u64, 5, buf);
    let total_elements_to_append = from_be_bytes_slice_and_advance_buf!(u64, 3, buf);
    let contexts_count = from_be_bytes_slice_and_advance_buf!(u32, 3, buf) as usize;

    // bound the allocation by what the buffer can actually hold.
    let mut contexts =
        Vec::with_capacity(contexts_count.min(buf.len() / BatchContext::BYTES_LENGTH));
    for _ in 0..contexts_count {
        contexts.push(BatchContext::try_from_buf(buf).ok_or(DecodingError::Eof)?);
    }

    let transactions_count: usize =
        contexts.iter().map(|c| c.num_sequenced_transactions as usize).sum();
    let mut transactions =
        Vec::with_capacity(transactions_count.min(buf.len() / TRANSACTION_LENGTH_PREFIX));
    for _ in 0..transactions_count {
        if buf.len() < TRANSACTION_LENGTH_PREFIX {
            return Err(DecodingError::Eof)
        }
        let length = from_be_bytes_slice_and_advance_buf!(u32, TRANSACTION_LENGTH_PREFIX, buf);
        let length = length as usize;
        if buf.len() < length {
            return Err(DecodingError::Eof)
        }
        transactions.push(Bytes::copy_from_slice(&buf[..length]));
        buf.advance(length);
    }

    Ok(SequencerBatch { should_start_at_element, total_elements_to_append, contexts, transactions })
}

/// Encodes the [`SequencerBatch`] into the calldata of an `appendSequencerBatch()` call.
pub fn encode_sequencer_batch(batch: &SequencerBatch) -> Result<Bytes, CodecError> {
    let expected = batch.sequenced_transactions_count();
    if expected != batch.transactions.len() {
        return Err(EncodingError::TransactionCountMismatch {
            expected,
            actual: batch.transactions.len(),
        }
        .into())
    }

    let mut buf = Vec::with_capacity(
        SEQUENCER_BATCH_HEADER_LENGTH +
            batch.contexts.len() * BatchContext::BYTES_LENGTH +
            batch.transactions.iter().map(|tx| tx.len() + TRANSACTION_LENGTH_PREFIX).sum::<usize>(),
    );

    buf.extend_from_slice(&appendSequencerBatchCall::SELECTOR);
    put_be_bytes_checked!(buf, batch.should_start_at_element, 5, "shouldStartAtElement");
    put_be_bytes_checked!(buf, batch.total_elements_to_append, 3, "totalElementsToAppend");
    put_be_bytes_checked!(buf, batch.contexts.len(), 3, "numContexts");

    for context in &batch.contexts {
        context.encode(&mut buf)?;
    }
    for transaction in &batch.transactions {
        put_be_bytes_checked!(buf, transaction.len(), TRANSACTION_LENGTH_PREFIX, "transactionLength");
        buf.extend_from_slice(transaction);
    }

    Ok(buf.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_batch, SAMPLE_BATCH_SIZE};

    use alloy_primitives::{bytes, hex};

    #[test]
    fn test_should_decode_sequencer_batch() -> eyre::Result<()> {
        // selector | start 5 | total 3 | 1 context | (2 sequenced, 1 queue, ts 0x10, block 0x20)
        // | 2 transactions of 2 and 1 bytes.
        let calldata = [
            appendSequencerBatchCall::SELECTOR.as_slice(),
            hex!("0000000005 000003 000001").as_slice(),
            hex!("000002 000001 0000000010 0000000020").as_slice(),
            hex!("000002 aabb 000001 cc").as_slice(),
        ]
        .concat();

        let batch = decode_sequencer_batch(&calldata)?;

        assert_eq!(batch.should_start_at_element, 5);
        assert_eq!(batch.total_elements_to_append, 3);
        assert_eq!(
            batch.contexts,
            vec![BatchContext {
                num_sequenced_transactions: 2,
                num_subsequent_queue_transactions: 1,
                timestamp: 0x10,
                block_number: 0x20,
            }]
        );
        assert_eq!(batch.transactions, vec![bytes!("aabb"), bytes!("cc")]);

        Ok(())
    }

    #[test]
    fn test_should_decode_encoded_sample_batch() -> eyre::Result<()> {
        let (calldata, batch, _) = sample_batch();

        let decoded = decode_sequencer_batch(&calldata)?;
        assert_eq!(decoded, batch);
        assert_eq!(decoded.transactions.len() + 3, SAMPLE_BATCH_SIZE);
        assert_eq!(encode_sequencer_batch(&decoded)?, calldata);

        Ok(())
    }

    #[test]
    fn test_should_fail_on_short_calldata() {
        let calldata = appendSequencerBatchCall::SELECTOR.to_vec();

        let err = decode_sequencer_batch(&calldata).unwrap_err();

        let CodecError::SequencerBatch { calldata: raw, error } = &err else {
            panic!("expected sequencer batch error, got {err:?}")
        };
        assert_eq!(raw.as_ref(), calldata.as_slice());
        assert_eq!(error, &DecodingError::CalldataTooShort { length: 4, minimum: 15 });
        assert!(err.to_string().contains(&hex::encode(&calldata)));
    }

    #[test]
    fn test_should_fail_on_unexpected_selector() {
        let calldata = hex!("deadbeef 0000000000 000000 000000");

        let err = decode_sequencer_batch(&calldata).unwrap_err();

        assert!(matches!(
            err,
            CodecError::SequencerBatch {
                error: DecodingError::UnexpectedSelector([0xde, 0xad, 0xbe, 0xef]),
                ..
            }
        ));
    }

    #[test]
    fn test_should_fail_on_truncated_contexts_and_transactions() {
        let header = [
            appendSequencerBatchCall::SELECTOR.as_slice(),
            hex!("0000000000 000001 000001").as_slice(),
        ]
        .concat();

        // missing context.
        let err = decode_sequencer_batch(&header).unwrap_err();
        assert!(matches!(err, CodecError::SequencerBatch { error: DecodingError::Eof, .. }));

        // context declares a transaction which is truncated.
        let calldata = [
            header.as_slice(),
            hex!("000001 000000 0000000000 0000000000").as_slice(),
            hex!("000004 aabb").as_slice(),
        ]
        .concat();
        let err = decode_sequencer_batch(&calldata).unwrap_err();
        assert!(matches!(err, CodecError::SequencerBatch { error: DecodingError::Eof, .. }));
    }

    #[test]
    fn test_should_fail_to_encode_overflowing_fields() {
        let batch = SequencerBatch {
            should_start_at_element: 1 << 40,
            ..Default::default()
        };
        let err = encode_sequencer_batch(&batch).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Encoding(EncodingError::FieldOverflow { field: "shouldStartAtElement", .. })
        ));

        let batch = SequencerBatch {
            contexts: vec![BatchContext { num_sequenced_transactions: 1, ..Default::default() }],
            ..Default::default()
        };
        let err = encode_sequencer_batch(&batch).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Encoding(EncodingError::TransactionCountMismatch { expected: 1, actual: 0 })
        ));
    }
}
