use dtl_primitives::PrimitiveError;

/// The result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// The error type for database operations.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// A database error occurred.
    #[error("database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),
    /// A stored value could not be converted back into its primitive.
    #[error("invalid stored value: {0}")]
    InvalidValue(#[from] PrimitiveError),
    /// The decoded transaction could not be serialized or deserialized.
    #[error("decoded transaction serde error: {0}")]
    DecodedTransaction(#[from] serde_json::Error),
    /// A metadata value could not be parsed.
    #[error("invalid metadata value {value} for key {key}")]
    InvalidMetadata {
        /// The metadata key.
        key: &'static str,
        /// The stored value.
        value: String,
    },
}
