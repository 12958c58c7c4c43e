//! Fixtures for the codec.

use crate::{encode_sequencer_batch, encode_transaction, BatchContext, SequencerBatch};

use alloy_primitives::{Address, Bytes, B256};
use dtl_primitives::{DecodedTransaction, Signature, TransactionType};

/// The number of elements, sequencer and queue, of the [`sample_batch`].
pub const SAMPLE_BATCH_SIZE: usize = 101;

/// The contexts of the [`sample_batch`] as (sequenced, queue) counts.
const SAMPLE_CONTEXTS: [(u64, u64); 5] = [(20, 1), (20, 0), (19, 1), (20, 0), (19, 1)];

/// Returns the deterministic synthetic transaction at position `i`.
pub fn sample_transaction(i: u64) -> DecodedTransaction {
    let byte = i as u8;
    DecodedTransaction {
        sig: Signature {
            r: B256::repeat_byte(byte.wrapping_add(1)),
            s: B256::repeat_byte(0xa0 ^ byte),
            v: byte % 2,
        },
        gas_limit: 21_000 + i * 100,
        gas_price: 15 + i,
        nonce: i,
        target: Address::with_last_byte(byte),
        data: (0..i % 37).map(|j| (i + j) as u8).collect::<Vec<_>>().into(),
        tx_type: if i % 7 == 0 { TransactionType::EthSign } else { TransactionType::Eip155 },
    }
}

/// Returns a synthetic sequencer batch of [`SAMPLE_BATCH_SIZE`] elements spread over five
/// contexts, three of them queue elements, as a tuple of its calldata, the batch and the
/// sequencer transactions. The calldata is produced by the encoder, not captured from L1.
pub fn sample_batch() -> (Bytes, SequencerBatch, Vec<DecodedTransaction>) {
    let contexts: Vec<_> = SAMPLE_CONTEXTS
        .iter()
        .enumerate()
        .map(|(i, (sequenced, queue))| BatchContext {
            num_sequenced_transactions: *sequenced,
            num_subsequent_queue_transactions: *queue,
            timestamp: 1_610_000_000 + i as u64 * 15,
            block_number: 11_700_000 + i as u64,
        })
        .collect();
    let sequenced: u64 = SAMPLE_CONTEXTS.iter().map(|(sequenced, _)| sequenced).sum();
    let transactions: Vec<_> = (0..sequenced).map(sample_transaction).collect();
    let batch = SequencerBatch {
        should_start_at_element: 0,
        total_elements_to_append: SAMPLE_BATCH_SIZE as u64,
        contexts,
        transactions: transactions
            .iter()
            .map(|tx| encode_transaction(tx).expect("sample transaction fits"))
            .collect(),
    };
    let calldata = encode_sequencer_batch(&batch).expect("sample batch fits");

    (calldata, batch, transactions)
}
