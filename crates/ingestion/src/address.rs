//! Resolution of the tracked contract addresses through the address registry.

use crate::{
    client::{L1Client, LogQuery},
    EthRequestError, FilterLogError, IngestionResult,
};

use alloy_primitives::Address;
use alloy_sol_types::{SolCall, SolEvent};
use dtl_l1::{
    abi::{calls::getAddressCall, logs::AddressSet},
    TrackedContract,
};
use std::collections::HashMap;

/// Resolves the address of the tracked contracts, caching the address in effect at the synced
/// cursor.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    address_manager: Address,
    cache: HashMap<TrackedContract, Address>,
}

impl AddressResolver {
    /// Returns a new [`AddressResolver`] for the registry at `address_manager`.
    pub fn new(address_manager: Address) -> Self {
        Self { address_manager, cache: HashMap::new() }
    }

    /// Returns the cached address of the contract.
    pub fn cached(&self, contract: TrackedContract) -> Option<Address> {
        self.cache.get(&contract).copied()
    }

    /// Resolves the address of the contract at the provided block and caches it.
    pub async fn resolve_address<C: L1Client>(
        &mut self,
        client: &C,
        contract: TrackedContract,
        at_block: u64,
    ) -> IngestionResult<Address> {
        let address = self.fetch_address(client, contract, at_block).await?;
        tracing::debug!(target: "dtl::address", %contract, %address, at_block, "resolved address");
        self.cache.insert(contract, address);
        Ok(address)
    }

    /// Reads the address of the contract from the registry at the provided block, bypassing the
    /// cache.
    pub async fn fetch_address<C: L1Client>(
        &self,
        client: &C,
        contract: TrackedContract,
        at_block: u64,
    ) -> IngestionResult<Address> {
        let input = getAddressCall { name: contract.as_str().to_owned() }.abi_encode();
        let output = client.call(self.address_manager, input.into(), at_block).await?;
        Ok(getAddressCall::abi_decode_returns(&output)
            .map_err(|error| EthRequestError::InvalidReturnData { method: "getAddress", error })?)
    }

    /// Returns the [`AddressEpochs`] of the tracked contracts over the `[from, to]` range, built
    /// from the cached addresses and the `AddressSet` events of the registry in the range, in log
    /// order.
    pub async fn epochs<C: L1Client>(
        &self,
        client: &C,
        from: u64,
        to: u64,
    ) -> IngestionResult<AddressEpochs> {
        let query = LogQuery {
            addresses: vec![self.address_manager],
            event_signature: AddressSet::SIGNATURE_HASH,
            from_block: from,
            to_block: to,
        };
        let logs = client.logs(&query).await?;

        let mut epochs = AddressEpochs {
            epochs: self
                .cache
                .iter()
                .map(|(contract, address)| (*contract, vec![*address]))
                .collect(),
        };
        for log in logs {
            let update = AddressSet::decode_log(&log.inner)
                .map_err(|error| FilterLogError::DecodeLogFailed { log_type: "AddressSet", error })?
                .data;
            let Some(contract) = TrackedContract::from_name(&update.name) else { continue };
            if update.newAddress.is_zero() {
                continue
            }
            if epochs.push(contract, update.newAddress) {
                tracing::info!(target: "dtl::address", %contract, address = %update.newAddress, block_number = ?log.block_number, "address updated");
            }
        }

        Ok(epochs)
    }

    /// Advances the cache to the last addresses of the epochs. Called once the range the epochs
    /// were built for is committed.
    pub fn commit(&mut self, epochs: &AddressEpochs) {
        for (contract, changes) in &epochs.epochs {
            if let Some(address) = changes.last() {
                self.cache.insert(*contract, *address);
            }
        }
    }
}

/// The addresses of the tracked contracts over a block range, in order of registration. The
/// first address of a contract is the one in effect at the start of the range.
///
/// Events of every address of a contract over the range are valid: an address replaced within
/// the range keeps its events up to the end of the range, and only later ranges follow the new
/// address alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressEpochs {
    epochs: HashMap<TrackedContract, Vec<Address>>,
}

impl AddressEpochs {
    /// Pushes an address for the contract. Returns false if the address is already in effect.
    fn push(&mut self, contract: TrackedContract, address: Address) -> bool {
        let changes = self.epochs.entry(contract).or_default();
        if changes.last() == Some(&address) {
            return false
        }
        changes.push(address);
        true
    }

    /// Returns the distinct non-zero addresses of the contract over the range.
    pub fn addresses(&self, contract: TrackedContract) -> Vec<Address> {
        let mut addresses = Vec::new();
        for address in self.epochs.get(&contract).into_iter().flatten() {
            if !address.is_zero() && !addresses.contains(address) {
                addresses.push(*address);
            }
        }
        addresses
    }

    /// Returns the last address of the contract over the range.
    pub fn latest(&self, contract: TrackedContract) -> Option<Address> {
        self.epochs.get(&contract)?.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTC: TrackedContract = TrackedContract::CanonicalTransactionChain;

    fn epochs(changes: &[Address]) -> AddressEpochs {
        let mut epochs = AddressEpochs::default();
        for address in changes {
            epochs.push(CTC, *address);
        }
        epochs
    }

    #[test]
    fn test_should_list_addresses_of_range() {
        let (a, b) = (Address::with_last_byte(1), Address::with_last_byte(2));
        let epochs = epochs(&[a, b, a]);

        assert_eq!(epochs.addresses(CTC), vec![a, b]);
        assert_eq!(epochs.latest(CTC), Some(a));
        assert!(epochs.addresses(TrackedContract::StateCommitmentChain).is_empty());
        assert_eq!(epochs.latest(TrackedContract::StateCommitmentChain), None);
    }

    #[test]
    fn test_should_ignore_noop_and_zero_addresses() {
        let a = Address::with_last_byte(1);
        let mut epochs = epochs(&[Address::ZERO]);

        assert!(epochs.push(CTC, a));
        assert!(!epochs.push(CTC, a));
        assert_eq!(epochs.addresses(CTC), vec![a]);
        assert_eq!(epochs.latest(CTC), Some(a));
    }

    #[test]
    fn test_should_commit_latest_addresses() {
        let (a, b) = (Address::with_last_byte(1), Address::with_last_byte(2));
        let mut resolver = AddressResolver::new(Address::with_last_byte(0xaa));

        resolver.commit(&epochs(&[a, b]));

        assert_eq!(resolver.cached(CTC), Some(b));
        assert_eq!(resolver.cached(TrackedContract::ExecutionManager), None);
    }
}
