use alloy_sol_types::sol;

sol! {
    /// Appends a sequencer batch to the canonical transaction chain. The batch is encoded in a
    /// custom format following the selector rather than ABI encoded.
    #[derive(Debug)]
    function appendSequencerBatch() external;

    /// Appends a batch of state roots to the state commitment chain.
    #[derive(Debug, PartialEq, Eq)]
    function appendStateBatch(bytes32[] batch, uint256 shouldStartAtElement) external;

    /// Returns the address registered under `name` in the address registry.
    #[derive(Debug)]
    function getAddress(string name) external view returns (address);

    /// Returns the L2 chain id from the execution manager.
    #[derive(Debug)]
    function ovmCHAINID() external view returns (uint256);
}
