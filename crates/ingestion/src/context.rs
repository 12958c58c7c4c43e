use crate::{client::L1Client, EthRequestError, IngestionResult};

/// The L1 context of the L2 chain: an L1 block considered safe from reorgs and the L2 chain id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct L1Context {
    /// The L1 block number, if the block is at or behind the safe head.
    pub block_number: Option<u64>,
    /// The L1 block timestamp, if the block is at or behind the safe head.
    pub timestamp: Option<u64>,
    /// The L2 chain id, if known.
    pub chain_id: Option<u64>,
}

/// Returns the [`L1Context`] at the provided block, or at the safe head if none is provided. The
/// block fields are [`None`] for a block beyond the safe head.
pub async fn l1_context<C: L1Client>(
    client: &C,
    confirmations: u64,
    chain_id: Option<u64>,
    block: Option<u64>,
) -> IngestionResult<L1Context> {
    let safe_head = client.block_number().await?.saturating_sub(confirmations);
    let number = match block {
        Some(number) if number > safe_head => {
            return Ok(L1Context { block_number: None, timestamp: None, chain_id })
        }
        Some(number) => number,
        None => safe_head,
    };

    let block = client.block(number).await?.ok_or(EthRequestError::MissingBlock(number))?;
    Ok(L1Context { block_number: Some(block.number), timestamp: Some(block.timestamp), chain_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockL1Client;

    #[tokio::test]
    async fn test_should_return_safe_head_context() -> eyre::Result<()> {
        // Given
        let client = MockL1Client::default();
        client.mine(20);

        // When
        let latest = l1_context(&client, 5, Some(420), None).await?;
        let past = l1_context(&client, 5, Some(420), Some(3)).await?;
        let future = l1_context(&client, 5, None, Some(16)).await?;

        // Then
        assert_eq!(latest.block_number, Some(15));
        assert_eq!(latest.timestamp, Some(client.timestamp_of(15)));
        assert_eq!(latest.chain_id, Some(420));
        assert_eq!(past.block_number, Some(3));
        assert_eq!(future, L1Context::default());

        Ok(())
    }
}
