//! SQLite-backed meeting store.
//!
//! Raw SQL with rusqlite, no ORM. The connection sits behind a mutex and
//! every call runs on the blocking pool.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

use async_trait::async_trait;

use super::error::StoreError;
use super::init::{migrate, open_db};
use super::MeetingStore;
use crate::meeting::record::MeetingRecord;

pub struct SqliteMeetingStore {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl SqliteMeetingStore {
    /// Wrap an open connection, creating the partition table if needed.
    pub fn new(conn: Connection, partition: &str) -> Result<Self, StoreError> {
        migrate(&conn, partition)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            table: partition.to_string(),
        })
    }

    pub fn open(db_path: &Path, partition: &str) -> Result<Self> {
        let conn = open_db(db_path)?;
        let store = Self::new(conn, partition)?;
        debug!("Opened meeting store {:?} (partition {})", db_path, partition);
        Ok(store)
    }

    pub fn open_in_memory(partition: &str) -> Result<Self, StoreError> {
        Self::new(Connection::open_in_memory()?, partition)
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &str) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let table = self.table.clone();

        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            f(&mut *guard, &table)
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}

fn decode(value: String, version: i64) -> Result<MeetingRecord, StoreError> {
    let mut record: MeetingRecord = serde_json::from_str(&value)?;
    // The column is authoritative for the version.
    record.version = version as u64;
    Ok(record)
}

#[async_trait]
impl MeetingStore for SqliteMeetingStore {
    async fn get(&self, id: &str) -> Result<Option<MeetingRecord>, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn, table| {
            let row = conn
                .query_row(
                    &format!("SELECT value, version FROM {table} WHERE key = ?1"),
                    params![id],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()?;

            row.map(|(value, version)| decode(value, version)).transpose()
        })
        .await
    }

    async fn put(&self, record: &MeetingRecord) -> Result<MeetingRecord, StoreError> {
        let mut stored = record.clone();
        self.with_conn(move |conn, table| {
            let tx = conn.transaction()?;

            let found: Option<i64> = tx
                .query_row(
                    &format!("SELECT version FROM {table} WHERE key = ?1"),
                    params![stored.id],
                    |row| row.get(0),
                )
                .optional()?;

            // A missing key only accepts a never-stored record
            let found = found.map_or(0, |v| v as u64);
            if found != stored.version {
                return Err(StoreError::Conflict {
                    id: stored.id,
                    expected: stored.version,
                    found,
                });
            }

            stored.version += 1;
            let value = serde_json::to_string(&stored)?;

            tx.execute(
                &format!(
                    "INSERT INTO {table} (key, value, version, updated_at) \
                     VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP) \
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
                     version = excluded.version, updated_at = CURRENT_TIMESTAMP"
                ),
                params![stored.id, value, stored.version as i64],
            )?;
            tx.commit()?;

            Ok(stored)
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn, table| {
            let deleted = conn.execute(&format!("DELETE FROM {table} WHERE key = ?1"), params![id])?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn values(&self) -> Result<Vec<MeetingRecord>, StoreError> {
        self.with_conn(|conn, table| {
            let mut stmt =
                conn.prepare(&format!("SELECT value, version FROM {table} ORDER BY rowid ASC"))?;

            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(value, version)| decode(value, version))
                .collect()
        })
        .await
    }
}
