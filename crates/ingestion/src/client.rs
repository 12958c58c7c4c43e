//! The L1 RPC client seam of the ingestion.

use alloy_network::TransactionResponse;
use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{
    BlockId, BlockNumberOrTag, Filter, Log, TransactionInput, TransactionRequest, TransactionTrait,
};
use alloy_transport::TransportResult;

/// The fields of an L1 block used by the ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct L1Block {
    /// The block number.
    pub number: u64,
    /// The block hash.
    pub hash: B256,
    /// The block timestamp.
    pub timestamp: u64,
}

/// The fields of an L1 transaction used by the ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L1Transaction {
    /// The transaction hash.
    pub hash: B256,
    /// The sender.
    pub from: Address,
    /// The calldata.
    pub input: Bytes,
}

/// A logs query for a single event signature emitted by any of `addresses`, over the inclusive
/// `[from_block, to_block]` range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    /// The emitting addresses.
    pub addresses: Vec<Address>,
    /// The event signature hash.
    pub event_signature: B256,
    /// The first block of the range.
    pub from_block: u64,
    /// The last block of the range.
    pub to_block: u64,
}

impl From<&LogQuery> for Filter {
    fn from(query: &LogQuery) -> Self {
        Self::new()
            .address(query.addresses.clone())
            .event_signature(query.event_signature)
            .from_block(query.from_block)
            .to_block(query.to_block)
    }
}

/// The capabilities of the L1 RPC endpoint required by the ingestion.
#[async_trait::async_trait]
pub trait L1Client: Send + Sync {
    /// Returns the current L1 block height.
    async fn block_number(&self) -> TransportResult<u64>;

    /// Returns the block at the provided height.
    async fn block(&self, number: u64) -> TransportResult<Option<L1Block>>;

    /// Returns the transaction for the provided hash.
    async fn transaction(&self, hash: B256) -> TransportResult<Option<L1Transaction>>;

    /// Returns the logs matching the query.
    async fn logs(&self, query: &LogQuery) -> TransportResult<Vec<Log>>;

    /// Calls the read-only contract method at `to` with the `input`, at the provided block.
    async fn call(&self, to: Address, input: Bytes, block: u64) -> TransportResult<Bytes>;
}

#[async_trait::async_trait]
impl<P> L1Client for P
where
    P: Provider,
{
    async fn block_number(&self) -> TransportResult<u64> {
        self.get_block_number().await
    }

    async fn block(&self, number: u64) -> TransportResult<Option<L1Block>> {
        Ok(self.get_block_by_number(BlockNumberOrTag::Number(number)).await?.map(|block| {
            L1Block {
                number: block.header.number,
                hash: block.header.hash,
                timestamp: block.header.timestamp,
            }
        }))
    }

    async fn transaction(&self, hash: B256) -> TransportResult<Option<L1Transaction>> {
        Ok(self.get_transaction_by_hash(hash).await?.map(|tx| L1Transaction {
            hash: tx.tx_hash(),
            from: tx.from(),
            input: tx.input().clone(),
        }))
    }

    async fn logs(&self, query: &LogQuery) -> TransportResult<Vec<Log>> {
        self.get_logs(&query.into()).await
    }

    async fn call(&self, to: Address, input: Bytes, block: u64) -> TransportResult<Bytes> {
        let request = TransactionRequest::default().to(to).input(TransactionInput::new(input));
        Provider::call(self, request).block(BlockId::number(block)).await
    }
}
