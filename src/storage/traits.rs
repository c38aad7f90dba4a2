//! Storage traits and error types

use crate::crawler::Thread;
use crate::storage::SnapshotRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(i64),

    #[error("Snapshot database is empty")]
    Empty,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for snapshot backends
///
/// A snapshot is an ordered copy of a crawl's threads, taken so a crawl's
/// results survive even if writing the delimited output fails.
pub trait SnapshotStore {
    /// Saves threads as a new snapshot
    ///
    /// # Returns
    ///
    /// The ID of the new snapshot
    fn save_snapshot(&mut self, site: &str, threads: &[Thread]) -> StorageResult<i64>;

    /// Loads a snapshot by ID
    fn load_snapshot(&self, id: i64) -> StorageResult<SnapshotRecord>;

    /// Loads the most recent snapshot
    fn latest_snapshot(&self) -> StorageResult<Option<SnapshotRecord>>;
}
