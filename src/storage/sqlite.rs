//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the SnapshotStore trait.

use crate::crawler::Thread;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{SnapshotStore, StorageError, StorageResult};
use crate::storage::SnapshotRecord;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite snapshot backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates a snapshot database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn load_threads(&self, snapshot_id: i64) -> StorageResult<Vec<Thread>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, url, word_count FROM threads WHERE snapshot_id = ?1 ORDER BY position",
        )?;

        let threads = stmt
            .query_map(params![snapshot_id], |row| {
                Ok(Thread {
                    name: row.get(0)?,
                    url: row.get(1)?,
                    word_count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(threads)
    }
}

impl SnapshotStore for SqliteStorage {
    fn save_snapshot(&mut self, site: &str, threads: &[Thread]) -> StorageResult<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO snapshots (site, taken_at) VALUES (?1, ?2)",
            params![site, Utc::now().to_rfc3339()],
        )?;
        let snapshot_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO threads (snapshot_id, position, name, url, word_count)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, thread) in threads.iter().enumerate() {
                stmt.execute(params![
                    snapshot_id,
                    position as i64,
                    thread.name,
                    thread.url,
                    thread.word_count
                ])?;
            }
        }

        tx.commit()?;
        Ok(snapshot_id)
    }

    fn load_snapshot(&self, id: i64) -> StorageResult<SnapshotRecord> {
        let header = self
            .conn
            .query_row(
                "SELECT site, taken_at FROM snapshots WHERE id = ?1",
                params![id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let (site, taken_at) = header.ok_or(StorageError::SnapshotNotFound(id))?;

        Ok(SnapshotRecord {
            id,
            site,
            taken_at,
            threads: self.load_threads(id)?,
        })
    }

    fn latest_snapshot(&self) -> StorageResult<Option<SnapshotRecord>> {
        let latest: Option<i64> = self
            .conn
            .query_row("SELECT MAX(id) FROM snapshots", [], |row| row.get(0))?;

        latest.map(|id| self.load_snapshot(id)).transpose()
    }
}
