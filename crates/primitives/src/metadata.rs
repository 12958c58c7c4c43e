/// The keys of the values stored in the metadata table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKey {
    /// The highest L1 block fully synced by the ingestion.
    SyncedL1Block,
    /// The L2 chain id read from the execution manager.
    L2ChainId,
}

impl MetadataKey {
    /// Returns the str representation of the [`MetadataKey`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SyncedL1Block => "l1_synced_block",
            Self::L2ChainId => "l2_chain_id",
        }
    }
}
