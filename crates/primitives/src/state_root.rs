use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// One committed L2 state root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct StateRootEntry {
    /// The global index of the state root.
    pub index: u64,
    /// The index of the state batch the root was submitted in.
    pub batch_index: u64,
    /// The state root.
    pub value: B256,
}
