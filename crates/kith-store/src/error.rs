//! Storage error types

use thiserror::Error;

/// Errors from a key-value backend.
///
/// Never retried at this layer; callers decide whether to retry the whole
/// operation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(String),

    /// The store was closed.
    #[error("store is closed")]
    Closed,
}
