use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// A sequencer batch submission of the canonical transaction chain.
pub type TransactionBatchEntry = BatchEntry;

/// A state batch submission of the state commitment chain.
pub type StateRootBatchEntry = BatchEntry;

/// One batch submission on the L1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    /// The batch index.
    pub index: u64,
    /// The batch root.
    pub root: B256,
    /// The number of elements in the batch.
    pub size: u64,
    /// The total number of elements submitted before the batch.
    pub prev_total_elements: u64,
    /// The batch extra data.
    pub extra_data: Bytes,
    /// The L1 block the batch was submitted at.
    pub block_number: u64,
    /// The timestamp of the L1 block the batch was submitted at.
    pub timestamp: u64,
    /// The sender of the submission transaction.
    pub submitter: Address,
    /// The hash of the submission transaction.
    pub l1_transaction_hash: B256,
}

impl BatchEntry {
    /// Returns the total number of elements after the batch.
    pub const fn total_elements(&self) -> u64 {
        self.prev_total_elements.saturating_add(self.size)
    }

    /// Returns true if `next` directly follows the batch.
    pub const fn is_followed_by(&self, next: &Self) -> bool {
        match self.index.checked_add(1) {
            Some(index) => index == next.index && self.total_elements() == next.prev_total_elements,
            None => false,
        }
    }
}
