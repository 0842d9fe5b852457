//! Durable meeting store.
//!
//! Meetings are persisted as full JSON snapshots keyed by meeting id, one
//! table per partition. Every write goes through `MeetingStore::put`, which
//! checks the record's `version` against the stored one before writing.

pub mod error;
pub mod init;
pub mod meetings;
pub mod memory;

use async_trait::async_trait;

use crate::meeting::record::MeetingRecord;

pub use error::StoreError;
pub use init::{migrate, open_db};
pub use meetings::SqliteMeetingStore;
pub use memory::MemoryMeetingStore;

/// Asynchronous key-value store of meeting snapshots.
#[async_trait]
pub trait MeetingStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<MeetingRecord>, StoreError>;

    /// Write the full record and return it as stored (version bumped).
    ///
    /// Fails with `StoreError::Conflict` when the stored version differs
    /// from `record.version`. A missing id counts as version 0, so a copy of
    /// a deleted record cannot be written back.
    async fn put(&self, record: &MeetingRecord) -> Result<MeetingRecord, StoreError>;

    /// Returns `true` when a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// All records in insertion order.
    async fn values(&self) -> Result<Vec<MeetingRecord>, StoreError>;
}
