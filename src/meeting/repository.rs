//! Meeting record repository.
//!
//! Implements the active/archived lifecycle on top of a `MeetingStore`:
//! at most one record is active (`is_archived == false`), every write is a
//! full snapshot, and archived records keep their id and archived flag.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::record::{now_timestamp, MeetingRecord, MeetingUpdate};
use crate::db::{MeetingStore, StoreError};

pub const DEFAULT_TITLE: &str = "Live Meeting";

#[derive(Clone)]
pub struct MeetingRepository {
    store: Arc<dyn MeetingStore>,
    default_title: String,
}

impl MeetingRepository {
    pub fn new(store: Arc<dyn MeetingStore>) -> Self {
        Self {
            store,
            default_title: DEFAULT_TITLE.to_string(),
        }
    }

    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Load the meeting to show as live.
    ///
    /// With `meeting_id`, the record with that id wins. Otherwise (or when
    /// the id is unknown) the first active record is returned. When there is
    /// no active record a new one is created and persisted.
    pub async fn load_active(&self, meeting_id: Option<&str>) -> Result<MeetingRecord, StoreError> {
        let records = self.store.values().await?;

        if let Some(id) = meeting_id {
            match records.iter().find(|r| r.id == id) {
                Some(record) => return Ok(record.clone()),
                None => debug!("Meeting {} not found, falling back to active meeting", id),
            }
        }

        if let Some(active) = records.iter().find(|r| r.is_active()) {
            return Ok(active.clone());
        }

        let record = MeetingRecord::new(
            fresh_id(&records),
            now_timestamp(),
            self.default_title.clone(),
        );
        let stored = self.store.put(&record).await?;

        info!("Created live meeting {} at {}", stored.id, stored.start_time);
        Ok(stored)
    }

    /// Archive the active meeting, stamping its end time.
    ///
    /// Returns `None` without writing anything when no meeting is active.
    pub async fn archive_active(&self) -> Result<Option<MeetingRecord>, StoreError> {
        let records = self.store.values().await?;

        let Some(mut record) = records.into_iter().find(|r| r.is_active()) else {
            debug!("No active meeting to archive");
            return Ok(None);
        };

        record.is_archived = true;
        record.end_time = Some(now_timestamp());
        let stored = self.store.put(&record).await?;

        info!("Archived meeting {}", stored.id);
        Ok(Some(stored))
    }

    /// Delete the record whose start time equals `start_time`.
    ///
    /// Only the first match in store order is removed.
    pub async fn delete_by_start_time(&self, start_time: &str) -> Result<bool, StoreError> {
        let records = self.store.values().await?;
        let mut matches = records.iter().filter(|r| r.start_time == start_time);

        let Some(target) = matches.next() else {
            debug!("No meeting started at {}", start_time);
            return Ok(false);
        };

        let others = matches.count();
        if others > 0 {
            warn!(
                "{} more meeting(s) share start time {}; deleting only {}",
                others, start_time, target.id
            );
        }

        let deleted = self.store.delete(&target.id).await?;
        if deleted {
            info!("Deleted meeting {} (started {})", target.id, start_time);
        }
        Ok(deleted)
    }

    /// Merge `update` into the stored record `id` and keep it archived.
    ///
    /// Returns `None` when no record has that id.
    pub async fn update_archived(
        &self,
        id: &str,
        update: MeetingUpdate,
    ) -> Result<Option<MeetingRecord>, StoreError> {
        let Some(existing) = self.store.get(id).await? else {
            debug!("Cannot update meeting {}: not found", id);
            return Ok(None);
        };

        if let Some(other) = update.id.as_deref().filter(|other| *other != id) {
            debug!("Ignoring id {} in update for meeting {}", other, id);
        }

        let merged = update.merge_into(existing);
        let stored = self.store.put(&merged).await?;

        info!("Updated archived meeting {}", stored.id);
        Ok(Some(stored))
    }

    /// Every record, newest start time first.
    pub async fn list_all(&self) -> Result<Vec<MeetingRecord>, StoreError> {
        let mut records = self.store.values().await?;
        records.sort_by(|a, b| {
            b.start_time
                .cmp(&a.start_time)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    pub async fn get(&self, id: &str) -> Result<Option<MeetingRecord>, StoreError> {
        self.store.get(id).await
    }

    /// Persist a full record, returning it as stored.
    pub async fn save(&self, record: &MeetingRecord) -> Result<MeetingRecord, StoreError> {
        self.store.put(record).await
    }
}

/// Meeting ids come from the creation time; a random suffix is only added
/// when that key is already taken.
fn fresh_id(existing: &[MeetingRecord]) -> String {
    let base = format!("meeting-{}", Utc::now().timestamp_millis());
    if existing.iter().any(|r| r.id == base) {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", base, &suffix[..8])
    } else {
        base
    }
}
