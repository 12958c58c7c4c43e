//! A library responsible for interacting with the database.

mod connection;
pub use connection::{DatabaseConnectionProvider, ReadConnectionProvider, WriteConnectionProvider};

mod db;
pub use db::Database;

mod error;
pub use error::{DatabaseError, DatabaseResult};

mod metrics;

mod models;
pub use models::*;

mod operations;
pub use operations::{DatabaseReadOperations, DatabaseWriteOperations};

mod transaction;
pub use transaction::TXMut;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use sea_orm::DbErr;
