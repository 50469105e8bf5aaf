//! Job record store: per-job metadata with expiry plus the bounded recency index.
//!
//! Two backends: SQLite (shared across processes) and an in-process memory
//! store used as a fake in tests.

mod memory;
mod recency;
mod sqlite;

pub use memory::MemoryRecordStore;
pub use recency::RecencyIndex;
pub use sqlite::SqliteRecordStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{JobId, JobRecord};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Upsert the full record, expiring `ttl_secs` from now. Idempotent.
    async fn put(&self, record: &JobRecord, ttl_secs: i64) -> Result<(), StoreError>;

    /// The stored record, or None if absent or expired. Never partial.
    async fn get(&self, id: &str) -> Result<Option<JobRecord>, StoreError>;

    /// Replace the display title of a live record. Returns false if absent/expired.
    async fn set_title(&self, id: &str, title: &str) -> Result<bool, StoreError>;

    /// Atomically move `id` to the head of the recency index and trim it to `cap`.
    async fn push_recent(&self, id: &str, cap: usize) -> Result<(), StoreError>;

    /// Recency index, head (most recent) first.
    async fn recent_ids(&self) -> Result<Vec<JobId>, StoreError>;

    /// Delete expired records. Returns the number removed.
    async fn purge_expired(&self) -> Result<u64, StoreError>;
}
