//! Store error types.

use thiserror::Error;

/// Errors from meeting store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A snapshot could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored version moved on since the record was read.
    #[error("Version conflict on meeting {id}: expected {expected}, found {found}")]
    Conflict { id: String, expected: u64, found: u64 },

    /// Partition names become table names and must be plain identifiers.
    #[error("Invalid partition name: {0}")]
    InvalidPartition(String),

    /// The store could not be reached (poisoned lock, failed background task).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
