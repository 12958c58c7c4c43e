/// The contracts tracked through the address registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TrackedContract {
    /// The canonical transaction chain, emitting enqueue and sequencer batch events.
    #[display("OVM_CanonicalTransactionChain")]
    CanonicalTransactionChain,
    /// The state commitment chain, emitting state batch events.
    #[display("OVM_StateCommitmentChain")]
    StateCommitmentChain,
    /// The execution manager, exposing the L2 chain id.
    #[display("OVM_ExecutionManager")]
    ExecutionManager,
}

impl TrackedContract {
    /// All the tracked contracts.
    pub const ALL: [Self; 3] =
        [Self::CanonicalTransactionChain, Self::StateCommitmentChain, Self::ExecutionManager];

    /// Returns the name the contract is registered under in the address registry.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CanonicalTransactionChain => "OVM_CanonicalTransactionChain",
            Self::StateCommitmentChain => "OVM_StateCommitmentChain",
            Self::ExecutionManager => "OVM_ExecutionManager",
        }
    }

    /// Returns the tracked contract registered under `name`, if any.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|contract| contract.as_str() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_round_trip_registry_names() {
        for contract in TrackedContract::ALL {
            assert_eq!(TrackedContract::from_name(contract.as_str()), Some(contract));
            assert_eq!(contract.to_string(), contract.as_str());
        }
        assert_eq!(TrackedContract::from_name("OVM_Sequencer"), None);
    }
}
