use crate::CodecError;

use alloy_primitives::{Bytes, B256, U256};
use alloy_sol_types::SolCall;
use dtl_l1::abi::calls::appendStateBatchCall;

/// Decodes the calldata of an `appendStateBatch(bytes32[],uint256)` call into its state roots.
pub fn decode_state_batch(calldata: &[u8]) -> Result<Vec<B256>, CodecError> {
    appendStateBatchCall::abi_decode(calldata).map(|call| call.batch).map_err(|error| {
        CodecError::StateBatch { calldata: Bytes::copy_from_slice(calldata), error }
    })
}

/// Encodes the state roots into the calldata of an `appendStateBatch(bytes32[],uint256)` call.
pub fn encode_state_batch(roots: &[B256], should_start_at_element: u64) -> Bytes {
    appendStateBatchCall {
        batch: roots.to_vec(),
        shouldStartAtElement: U256::from(should_start_at_element),
    }
    .abi_encode()
    .into()
}
