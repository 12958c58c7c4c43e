use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    event TransactionEnqueued(
        address l1TxOrigin,
        address target,
        uint256 gasLimit,
        bytes data,
        uint256 queueIndex,
        uint256 timestamp
    );

    #[derive(Debug, PartialEq, Eq)]
    event TransactionBatchAppended(
        uint256 indexed batchIndex,
        bytes32 batchRoot,
        uint256 batchSize,
        uint256 prevTotalElements,
        bytes extraData
    );

    #[derive(Debug, PartialEq, Eq)]
    event SequencerBatchAppended(
        uint256 startingQueueIndex,
        uint256 numQueueElements,
        uint256 totalElements
    );

    #[derive(Debug, PartialEq, Eq)]
    event StateBatchAppended(
        uint256 indexed batchIndex,
        bytes32 batchRoot,
        uint256 batchSize,
        uint256 prevTotalElements,
        bytes extraData
    );

    #[derive(Debug, PartialEq, Eq)]
    event AddressSet(string name, address newAddress);
}
