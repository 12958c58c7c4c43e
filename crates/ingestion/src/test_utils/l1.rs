use super::arbitrary::Arbitrary;
use crate::{
    client::{L1Block, L1Client, L1Transaction, LogQuery},
    random,
};

use alloy_primitives::{address, Address, Bytes, LogData, B256, U256};
use alloy_rpc_types_eth::Log;
use alloy_sol_types::{SolCall, SolEvent};
use alloy_transport::{TransportErrorKind, TransportResult};
use dtl_codec::{encode_sequencer_batch, encode_state_batch, BatchContext, SequencerBatch};
use dtl_l1::{
    abi::{
        calls::{getAddressCall, ovmCHAINIDCall},
        logs::{
            AddressSet, SequencerBatchAppended, StateBatchAppended, TransactionBatchAppended,
            TransactionEnqueued,
        },
    },
    TrackedContract,
};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

/// The timestamp of the genesis block of the [`MockL1Client`].
pub const GENESIS_TIMESTAMP: u64 = 1_600_000_000;

/// The block time of the [`MockL1Client`].
const BLOCK_TIME: u64 = 12;

/// An in memory L1 chain running the rollup contracts, implementing [`L1Client`].
///
/// Every submission is mined in its own block, emitting the events of the rollup contracts from
/// the addresses registered at that block.
#[derive(Debug, Clone, Default)]
pub struct MockL1Client {
    chain: Arc<Mutex<MockChain>>,
}

#[derive(Debug)]
struct MockChain {
    blocks: Vec<L1Block>,
    transactions: HashMap<B256, L1Transaction>,
    logs: Vec<Log>,
    registry: HashMap<String, Vec<(u64, Address)>>,
    chain_id: u64,
    queue_length: u64,
    queue_included: u64,
    total_elements: u64,
    transaction_batches: u64,
    total_state_roots: u64,
    state_batches: u64,
    failures: usize,
    log_queries: Vec<(u64, u64)>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            blocks: vec![L1Block { number: 0, hash: random!(B256), timestamp: GENESIS_TIMESTAMP }],
            transactions: HashMap::new(),
            logs: Vec::new(),
            registry: HashMap::new(),
            chain_id: 420,
            queue_length: 0,
            queue_included: 0,
            total_elements: 0,
            transaction_batches: 0,
            total_state_roots: 0,
            state_batches: 0,
            failures: 0,
            log_queries: Vec::new(),
        }
    }
}

impl MockChain {
    fn head(&self) -> u64 {
        self.blocks.len() as u64 - 1
    }

    fn mine(&mut self) -> L1Block {
        let number = self.blocks.len() as u64;
        let block = L1Block {
            number,
            hash: random!(B256),
            timestamp: GENESIS_TIMESTAMP + number * BLOCK_TIME,
        };
        self.blocks.push(block);
        block
    }

    fn address_at(&self, name: &str, block: u64) -> Address {
        self.registry
            .get(name)
            .and_then(|history| history.iter().rev().find(|(number, _)| *number <= block))
            .map(|(_, address)| *address)
            .unwrap_or_default()
    }

    /// Mines a block holding a single transaction which emits the provided events.
    fn submit(&mut self, from: Address, input: Bytes, events: Vec<(Address, LogData)>) -> L1Block {
        let block = self.mine();
        let hash = random!(B256);
        self.transactions.insert(hash, L1Transaction { hash, from, input });
        for (log_index, (address, data)) in events.into_iter().enumerate() {
            self.logs.push(Log {
                inner: alloy_primitives::Log { address, data },
                block_hash: Some(block.hash),
                block_number: Some(block.number),
                block_timestamp: Some(block.timestamp),
                transaction_hash: Some(hash),
                transaction_index: Some(0),
                log_index: Some(log_index as u64),
                removed: false,
            });
        }
        block
    }

    fn fail(&mut self) -> TransportResult<()> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(TransportErrorKind::custom_str("mock transport failure"))
        }
        Ok(())
    }
}

impl MockL1Client {
    /// The address of the address registry.
    pub const ADDRESS_MANAGER: Address = address!("0x100000000000000000000000000000000000000a");
    /// The sender of the sequencer batches.
    pub const SEQUENCER: Address = address!("0x200000000000000000000000000000000000000b");
    /// The sender of the state batches.
    pub const PROPOSER: Address = address!("0x300000000000000000000000000000000000000c");

    /// Returns the current head.
    pub fn head(&self) -> u64 {
        self.chain.lock().head()
    }

    /// Mines `count` empty blocks and returns the new head.
    pub fn mine(&self, count: u64) -> u64 {
        let mut chain = self.chain.lock();
        for _ in 0..count {
            chain.mine();
        }
        chain.head()
    }

    /// Returns the timestamp of the block.
    pub const fn timestamp_of(&self, block: u64) -> u64 {
        GENESIS_TIMESTAMP + block * BLOCK_TIME
    }

    /// Sets the L2 chain id returned by the execution manager.
    pub fn set_chain_id(&self, chain_id: u64) {
        self.chain.lock().chain_id = chain_id;
    }

    /// Fails the next `count` requests with a transport error.
    pub fn fail_next(&self, count: usize) {
        self.chain.lock().failures = count;
    }

    /// Returns the `[from, to]` ranges of the logs queries for the rollup events, in order.
    pub fn log_queries(&self) -> Vec<(u64, u64)> {
        self.chain.lock().log_queries.clone()
    }

    /// Removes the emitted logs of the event signature.
    pub fn remove_logs(&self, signature: B256) {
        self.chain.lock().logs.retain(|log| log.inner.data.topics().first() != Some(&signature));
    }

    /// Mines a block holding a transaction which emits the raw log from the address. Returns the
    /// block of the transaction.
    pub fn emit(&self, address: Address, data: LogData) -> u64 {
        self.chain.lock().submit(Self::SEQUENCER, Bytes::new(), vec![(address, data)]).number
    }

    /// Registers the address of the tracked contract and returns the block of the update.
    pub fn register(&self, contract: TrackedContract, address: Address) -> u64 {
        self.set_address(contract.as_str(), address)
    }

    /// Sets the address under `name` in the address registry and returns the block of the
    /// update.
    pub fn set_address(&self, name: &str, address: Address) -> u64 {
        let mut chain = self.chain.lock();
        let event = AddressSet { name: name.to_owned(), newAddress: address };
        let block = chain.submit(
            Self::SEQUENCER,
            Bytes::new(),
            vec![(Self::ADDRESS_MANAGER, event.encode_log_data())],
        );
        chain.registry.entry(name.to_owned()).or_default().push((block.number, address));
        block.number
    }

    /// Enqueues a transaction and returns its queue index.
    pub fn enqueue(&self, origin: Address, target: Address, gas_limit: u64, data: Bytes) -> u64 {
        let mut chain = self.chain.lock();
        let queue_index = chain.queue_length;
        let number = chain.head() + 1;
        let ctc = chain.address_at(TrackedContract::CanonicalTransactionChain.as_str(), number);
        let event = TransactionEnqueued {
            l1TxOrigin: origin,
            target,
            gasLimit: U256::from(gas_limit),
            data,
            queueIndex: U256::from(queue_index),
            timestamp: U256::from(self.timestamp_of(number)),
        };
        chain.submit(origin, Bytes::new(), vec![(ctc, event.encode_log_data())]);
        chain.queue_length += 1;
        queue_index
    }

    /// Appends a sequencer batch of the contexts and raw transactions, starting at the current
    /// total elements. Returns the block of the submission.
    pub fn append_sequencer_batch(
        &self,
        contexts: Vec<BatchContext>,
        transactions: Vec<Bytes>,
    ) -> u64 {
        let size: u64 = contexts
            .iter()
            .map(|c| c.num_sequenced_transactions + c.num_subsequent_queue_transactions)
            .sum();
        let num_queue_elements = contexts.iter().map(|c| c.num_subsequent_queue_transactions).sum();
        let batch = SequencerBatch {
            should_start_at_element: self.chain.lock().total_elements,
            total_elements_to_append: size,
            contexts,
            transactions,
        };
        let calldata = encode_sequencer_batch(&batch).expect("valid sequencer batch");
        self.append_sequencer_batch_calldata(calldata, size, num_queue_elements)
    }

    /// Appends a sequencer batch of `size` elements, `num_queue_elements` of them queue
    /// elements, submitted with the raw calldata. Returns the block of the submission.
    pub fn append_sequencer_batch_calldata(
        &self,
        calldata: Bytes,
        size: u64,
        num_queue_elements: u64,
    ) -> u64 {
        let mut chain = self.chain.lock();
        let number = chain.head() + 1;
        let ctc = chain.address_at(TrackedContract::CanonicalTransactionChain.as_str(), number);
        let prev_total_elements = chain.total_elements;
        let appended = TransactionBatchAppended {
            batchIndex: U256::from(chain.transaction_batches),
            batchRoot: random!(B256),
            batchSize: U256::from(size),
            prevTotalElements: U256::from(prev_total_elements),
            extraData: Bytes::new(),
        };
        let sequenced = SequencerBatchAppended {
            startingQueueIndex: U256::from(chain.queue_included),
            numQueueElements: U256::from(num_queue_elements),
            totalElements: U256::from(prev_total_elements + size),
        };
        let block = chain.submit(
            Self::SEQUENCER,
            calldata,
            vec![(ctc, appended.encode_log_data()), (ctc, sequenced.encode_log_data())],
        );
        chain.transaction_batches += 1;
        chain.total_elements += size;
        chain.queue_included += num_queue_elements;
        block.number
    }

    /// Appends a state batch of the roots. Returns the block of the submission.
    pub fn append_state_batch(&self, roots: Vec<B256>) -> u64 {
        let mut chain = self.chain.lock();
        let number = chain.head() + 1;
        let scc = chain.address_at(TrackedContract::StateCommitmentChain.as_str(), number);
        let prev_total_elements = chain.total_state_roots;
        let appended = StateBatchAppended {
            batchIndex: U256::from(chain.state_batches),
            batchRoot: random!(B256),
            batchSize: U256::from(roots.len()),
            prevTotalElements: U256::from(prev_total_elements),
            extraData: Bytes::new(),
        };
        let calldata = encode_state_batch(&roots, prev_total_elements);
        let block =
            chain.submit(Self::PROPOSER, calldata, vec![(scc, appended.encode_log_data())]);
        chain.state_batches += 1;
        chain.total_state_roots += roots.len() as u64;
        block.number
    }
}

#[async_trait::async_trait]
impl L1Client for MockL1Client {
    async fn block_number(&self) -> TransportResult<u64> {
        let mut chain = self.chain.lock();
        chain.fail()?;
        Ok(chain.head())
    }

    async fn block(&self, number: u64) -> TransportResult<Option<L1Block>> {
        let mut chain = self.chain.lock();
        chain.fail()?;
        Ok(chain.blocks.get(number as usize).copied())
    }

    async fn transaction(&self, hash: B256) -> TransportResult<Option<L1Transaction>> {
        let mut chain = self.chain.lock();
        chain.fail()?;
        Ok(chain.transactions.get(&hash).cloned())
    }

    async fn logs(&self, query: &LogQuery) -> TransportResult<Vec<Log>> {
        let mut chain = self.chain.lock();
        chain.fail()?;
        if query.event_signature != AddressSet::SIGNATURE_HASH &&
            query.event_signature != TransactionBatchAppended::SIGNATURE_HASH
        {
            chain.log_queries.push((query.from_block, query.to_block));
        }
        Ok(chain
            .logs
            .iter()
            .filter(|log| {
                query.addresses.contains(&log.address()) &&
                    log.inner.data.topics().first() == Some(&query.event_signature) &&
                    log.block_number
                        .is_some_and(|number| (query.from_block..=query.to_block).contains(&number))
            })
            .cloned()
            .collect())
    }

    async fn call(&self, to: Address, input: Bytes, block: u64) -> TransportResult<Bytes> {
        let mut chain = self.chain.lock();
        chain.fail()?;

        if to == Self::ADDRESS_MANAGER {
            let call = getAddressCall::abi_decode(&input)
                .map_err(|err| TransportErrorKind::custom_str(&err.to_string()))?;
            let address = chain.address_at(&call.name, block);
            return Ok(getAddressCall::abi_encode_returns(&address).into())
        }

        let execution_manager =
            chain.address_at(TrackedContract::ExecutionManager.as_str(), block);
        if input.starts_with(&ovmCHAINIDCall::SELECTOR) && !to.is_zero() && to == execution_manager
        {
            return Ok(ovmCHAINIDCall::abi_encode_returns(&U256::from(chain.chain_id)).into())
        }

        // Calls to accounts without code succeed with empty return data.
        Ok(Bytes::new())
    }
}
