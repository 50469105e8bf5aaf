//! Job queue: owns live execution status.
//!
//! The HTTP side enqueues and reads status; workers claim jobs and report
//! the outcome. A finished or failed job stays visible for the result TTL,
//! after which the queue no longer knows the id.

mod ids;
mod memory;
mod sqlite;

pub use ids::{JobIdSource, SequentialIds, UuidIds};
pub use memory::MemoryJobQueue;
pub use sqlite::SqliteJobQueue;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{ClaimedJob, DownloadTask, JobId, JobStatus};

#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Queue `task` and return its newly assigned id.
    async fn enqueue(&self, task: DownloadTask) -> Result<JobId, StoreError>;

    /// Live status, or None when the queue has no (unexpired) record of `id`.
    async fn status(&self, id: &str) -> Result<Option<JobStatus>, StoreError>;

    /// Atomically take the oldest queued job and mark it running.
    async fn claim_next(&self) -> Result<Option<ClaimedJob>, StoreError>;

    async fn mark_finished(&self, id: &str) -> Result<(), StoreError>;

    async fn mark_failed(&self, id: &str, message: &str) -> Result<(), StoreError>;

    /// Failure message of a failed job still known to the queue.
    async fn error_of(&self, id: &str) -> Result<Option<String>, StoreError>;

    /// Put jobs left running by a dead worker back in the queue. Returns how many.
    async fn recover_running(&self) -> Result<u64, StoreError>;

    /// Forget finished/failed jobs past the result TTL. Returns how many.
    async fn purge_expired(&self) -> Result<u64, StoreError>;
}
