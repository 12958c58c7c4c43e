use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

/// A transaction submitted directly to the L1 for later inclusion in the canonical transaction
/// chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct EnqueueEntry {
    /// The queue index of the enqueued transaction.
    pub index: u64,
    /// The call target.
    pub target: Address,
    /// The call data.
    pub data: Bytes,
    /// The gas limit.
    pub gas_limit: u64,
    /// The L1 sender of the transaction.
    pub origin: Address,
    /// The L1 block the transaction was enqueued at.
    pub block_number: u64,
    /// The timestamp the transaction was enqueued at.
    pub timestamp: u64,
    /// The global index the transaction was included at, once a sequencer batch included it.
    pub ctc_index: Option<u64>,
}
