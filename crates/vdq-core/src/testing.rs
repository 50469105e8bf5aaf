//! Failing backends for exercising error paths.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::queue::JobQueue;
use crate::store::RecordStore;
use crate::types::{ClaimedJob, DownloadTask, JobId, JobRecord, JobStatus};

fn refused() -> StoreError {
    StoreError::Unavailable("connection refused".into())
}

/// Record store whose every call fails, as if the database went away.
pub struct DownStore;

#[async_trait]
impl RecordStore for DownStore {
    async fn put(&self, _: &JobRecord, _: i64) -> Result<(), StoreError> {
        Err(refused())
    }
    async fn get(&self, _: &str) -> Result<Option<JobRecord>, StoreError> {
        Err(refused())
    }
    async fn set_title(&self, _: &str, _: &str) -> Result<bool, StoreError> {
        Err(refused())
    }
    async fn push_recent(&self, _: &str, _: usize) -> Result<(), StoreError> {
        Err(refused())
    }
    async fn recent_ids(&self) -> Result<Vec<JobId>, StoreError> {
        Err(refused())
    }
    async fn purge_expired(&self) -> Result<u64, StoreError> {
        Err(refused())
    }
}

/// Job queue whose every call fails.
pub struct DownQueue;

#[async_trait]
impl JobQueue for DownQueue {
    async fn enqueue(&self, _: DownloadTask) -> Result<JobId, StoreError> {
        Err(refused())
    }
    async fn status(&self, _: &str) -> Result<Option<JobStatus>, StoreError> {
        Err(refused())
    }
    async fn claim_next(&self) -> Result<Option<ClaimedJob>, StoreError> {
        Err(refused())
    }
    async fn mark_finished(&self, _: &str) -> Result<(), StoreError> {
        Err(refused())
    }
    async fn mark_failed(&self, _: &str, _: &str) -> Result<(), StoreError> {
        Err(refused())
    }
    async fn error_of(&self, _: &str) -> Result<Option<String>, StoreError> {
        Err(refused())
    }
    async fn recover_running(&self) -> Result<u64, StoreError> {
        Err(refused())
    }
    async fn purge_expired(&self) -> Result<u64, StoreError> {
        Err(refused())
    }
}
