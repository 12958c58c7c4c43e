/// The [`DatabaseConnectionProvider`] trait provides a way to get a connection to the database.
/// This is implemented by the [`crate::Database`] and [`crate::TXMut`] types.
pub trait DatabaseConnectionProvider: Send + Sync {
    /// The type of the connection.
    type Connection: sea_orm::ConnectionTrait + sea_orm::StreamTrait + Send + Sync;

    /// Returns a reference to the database connection that implements the `ConnectionTrait` and
    /// `StreamTrait` traits.
    fn get_connection(&self) -> &Self::Connection;
}

/// A marker trait for providers which can be read from.
pub trait ReadConnectionProvider: DatabaseConnectionProvider {}

/// A marker trait for providers which can be written to. Only atomic transactions implement it,
/// such that all writes are made visible to readers together.
pub trait WriteConnectionProvider: ReadConnectionProvider {}
