/// Errors related to the data transport layer primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// The string does not name a known queue origin.
    UnknownQueueOrigin(String),
    /// The string does not name a known transaction type.
    UnknownTransactionType(String),
}

impl core::fmt::Display for PrimitiveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownQueueOrigin(origin) => write!(f, "unknown queue origin: {origin}"),
            Self::UnknownTransactionType(ty) => write!(f, "unknown transaction type: {ty}"),
        }
    }
}

impl core::error::Error for PrimitiveError {}
