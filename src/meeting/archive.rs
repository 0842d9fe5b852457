//! Archival operations for history surfaces.
//!
//! Thin wrappers over `MeetingRepository` used by the CLI and the HTTP API.
//! Store failures are logged here and reported as `None`, `false` or an
//! empty list; they never propagate to the caller.

use tracing::error;

use super::record::{MeetingRecord, MeetingUpdate};
use super::repository::MeetingRepository;

/// Archive the active meeting, if any.
pub async fn archive_active(repo: &MeetingRepository) -> Option<MeetingRecord> {
    match repo.archive_active().await {
        Ok(record) => record,
        Err(e) => {
            error!("Failed to archive active meeting: {}", e);
            None
        }
    }
}

/// Delete the meeting that started at `start_time`. Returns whether a
/// record was removed.
pub async fn delete_by_start_time(repo: &MeetingRepository, start_time: &str) -> bool {
    match repo.delete_by_start_time(start_time).await {
        Ok(deleted) => deleted,
        Err(e) => {
            error!("Failed to delete meeting started at {}: {}", start_time, e);
            false
        }
    }
}

pub async fn update_archived(
    repo: &MeetingRepository,
    id: &str,
    update: MeetingUpdate,
) -> Option<MeetingRecord> {
    match repo.update_archived(id, update).await {
        Ok(record) => record,
        Err(e) => {
            error!("Failed to update meeting {}: {}", id, e);
            None
        }
    }
}

pub async fn list_all(repo: &MeetingRepository) -> Vec<MeetingRecord> {
    match repo.list_all().await {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to list meetings: {}", e);
            Vec::new()
        }
    }
}

pub async fn get(repo: &MeetingRepository, id: &str) -> Option<MeetingRecord> {
    match repo.get(id).await {
        Ok(record) => record,
        Err(e) => {
            error!("Failed to load meeting {}: {}", id, e);
            None
        }
    }
}
