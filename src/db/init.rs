use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use super::error::StoreError;

pub fn open_db(db_path: &Path) -> Result<Connection> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let conn = Connection::open(db_path).context("Failed to open database connection")?;

    Ok(conn)
}

pub fn validate_partition(partition: &str) -> Result<(), StoreError> {
    let valid = !partition.is_empty()
        && !partition.starts_with(|c: char| c.is_ascii_digit())
        && partition
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidPartition(partition.to_string()))
    }
}

/// Create the snapshot table for `partition` if it does not exist yet.
pub fn migrate(conn: &Connection, partition: &str) -> Result<(), StoreError> {
    validate_partition(partition)?;

    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {partition} (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 0,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )"
        ),
        [],
    )?;

    Ok(())
}
