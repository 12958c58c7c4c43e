use crate::client::{L1Block, L1Client, L1Transaction, LogQuery};

use alloy_primitives::{Address, Bytes, B256};
use alloy_rpc_types_eth::Log;
use alloy_transport::TransportResult;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// The default capacity for the block cache.
pub const BLOCK_CACHE_CAPACITY: NonZeroUsize =
    NonZeroUsize::new(1000).expect("non zero capacity");

/// The default capacity for the transaction cache.
pub const TRANSACTION_CACHE_CAPACITY: NonZeroUsize =
    NonZeroUsize::new(100).expect("non zero capacity");

/// An [`L1Client`] caching the blocks and transactions fetched by the handlers.
#[derive(Debug)]
pub struct CachedL1Client<C> {
    inner: C,
    blocks: Mutex<LruCache<u64, L1Block>>,
    transactions: Mutex<LruCache<B256, L1Transaction>>,
}

impl<C> CachedL1Client<C> {
    /// Returns a new [`CachedL1Client`] with the default capacities.
    pub fn new(inner: C) -> Self {
        Self::with_capacity(inner, BLOCK_CACHE_CAPACITY, TRANSACTION_CACHE_CAPACITY)
    }

    /// Returns a new [`CachedL1Client`] with the provided capacities.
    pub fn with_capacity(
        inner: C,
        block_capacity: NonZeroUsize,
        transaction_capacity: NonZeroUsize,
    ) -> Self {
        Self {
            inner,
            blocks: Mutex::new(LruCache::new(block_capacity)),
            transactions: Mutex::new(LruCache::new(transaction_capacity)),
        }
    }

    /// Returns a reference to the wrapped client.
    pub const fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait::async_trait]
impl<C: L1Client> L1Client for CachedL1Client<C> {
    async fn block_number(&self) -> TransportResult<u64> {
        self.inner.block_number().await
    }

    async fn block(&self, number: u64) -> TransportResult<Option<L1Block>> {
        if let Some(block) = self.blocks.lock().get(&number) {
            return Ok(Some(*block));
        }

        let block = self.inner.block(number).await?;
        if let Some(block) = block {
            self.blocks.lock().put(number, block);
        }
        Ok(block)
    }

    async fn transaction(&self, hash: B256) -> TransportResult<Option<L1Transaction>> {
        if let Some(transaction) = self.transactions.lock().get(&hash) {
            return Ok(Some(transaction.clone()));
        }

        let transaction = self.inner.transaction(hash).await?;
        if let Some(transaction) = &transaction {
            self.transactions.lock().put(hash, transaction.clone());
        }
        Ok(transaction)
    }

    async fn logs(&self, query: &LogQuery) -> TransportResult<Vec<Log>> {
        self.inner.logs(query).await
    }

    async fn call(&self, to: Address, input: Bytes, block: u64) -> TransportResult<Bytes> {
        self.inner.call(to, input, block).await
    }
}
