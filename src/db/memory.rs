//! In-memory meeting store, for tests and ephemeral sessions.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::error::StoreError;
use super::MeetingStore;
use crate::meeting::record::MeetingRecord;

#[derive(Default)]
pub struct MemoryMeetingStore {
    records: Mutex<Vec<MeetingRecord>>,
}

impl MemoryMeetingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MeetingStore for MemoryMeetingStore {
    async fn get(&self, id: &str) -> Result<Option<MeetingRecord>, StoreError> {
        let records = self.records.lock().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn put(&self, record: &MeetingRecord) -> Result<MeetingRecord, StoreError> {
        let mut records = self.records.lock().await;
        let position = records.iter().position(|r| r.id == record.id);

        // A missing key only accepts a never-stored record
        let found = position.map_or(0, |i| records[i].version);
        if found != record.version {
            return Err(StoreError::Conflict {
                id: record.id.clone(),
                expected: record.version,
                found,
            });
        }

        let mut stored = record.clone();
        stored.version += 1;
        match position {
            Some(i) => records[i] = stored.clone(),
            None => records.push(stored.clone()),
        }

        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }

    async fn values(&self) -> Result<Vec<MeetingRecord>, StoreError> {
        Ok(self.records.lock().await.clone())
    }
}
