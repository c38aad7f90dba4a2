//! Storage module for thread snapshots
//!
//! After a word-count pass the full thread list can be dumped to a SQLite
//! database. The snapshot is write-mostly: it is never used to resume a
//! crawl, only re-exported as delimited output when needed.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{SnapshotStore, StorageError, StorageResult};

use crate::crawler::Thread;

/// Represents a saved snapshot
#[derive(Debug, Clone)]
pub struct SnapshotRecord {
    pub id: i64,
    pub site: String,
    pub taken_at: String,
    pub threads: Vec<Thread>,
}
