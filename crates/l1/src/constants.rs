use alloy_primitives::{address, Address};

/// The L2 address sequencer transactions are sent to.
pub const SEQUENCER_ENTRYPOINT_ADDRESS: Address =
    address!("0x4200000000000000000000000000000000000005");

/// The gas limit assigned to every sequencer transaction.
pub const SEQUENCER_GAS_LIMIT: u64 = 8_000_000;
