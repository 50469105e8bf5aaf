//! Job lifecycle manager: submit → track → query.
//!
//! A submission is validated, enqueued (the queue assigns the id), recorded
//! with a 24h expiry and pushed onto the recency index. The queue is the
//! source of truth for existence: once enqueue succeeds there is no rollback.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::{METADATA_TTL_SECS, RECENCY_CAP};
use crate::error::{JobError, StoreError};
use crate::queue::JobQueue;
use crate::store::RecordStore;
use crate::types::{DownloadTask, JobId, JobRecord, JobStatus, SubmitRequest};
use crate::url_policy::UrlValidator;

/// Title shown until the worker learns the real one.
pub const PLACEHOLDER_TITLE: &str = "...";

pub struct JobManager {
    queue: Arc<dyn JobQueue>,
    store: Arc<dyn RecordStore>,
    validator: Arc<dyn UrlValidator>,
    clock: Arc<dyn Clock>,
}

impl JobManager {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        store: Arc<dyn RecordStore>,
        validator: Arc<dyn UrlValidator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            queue,
            store,
            validator,
            clock,
        }
    }

    /// Accept a submission and return the new job's id.
    ///
    /// Validation failures mutate nothing. A store failure after a successful
    /// enqueue is reported as `StoreUnavailable`; the job stays queued but
    /// will not show up in snapshots until its metadata exists.
    pub async fn submit(&self, req: &SubmitRequest) -> Result<JobId, JobError> {
        let Some(raw) = req.input_url.as_deref() else {
            tracing::warn!("rejecting submission missing 'input_url'");
            return Err(JobError::InvalidInput);
        };
        let Some(url) = self.validator.validate(raw) else {
            tracing::warn!(url = %raw, "rejecting submission");
            return Err(JobError::RejectedUrl(raw.to_string()));
        };

        tracing::info!(url = %url, "accepting submission");
        let id = self.queue.enqueue(DownloadTask { url: url.clone() }).await?;

        let record = JobRecord {
            id: id.clone(),
            request_url: url,
            submitted_at: self.clock.now(),
            display_title: PLACEHOLDER_TITLE.to_string(),
        };
        if let Err(e) = self.track(&record).await {
            tracing::warn!(job_id = %id, error = %e, "job enqueued but not tracked");
            return Err(e.into());
        }

        tracing::debug!(job_id = %id, "job tracked");
        Ok(id)
    }

    /// Live queue status of a single job.
    pub async fn job_status(&self, id: &str) -> Result<JobStatus, JobError> {
        self.queue
            .status(id)
            .await?
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    /// Failure message of a failed job, while the queue still remembers it.
    pub async fn job_error(&self, id: &str) -> Result<Option<String>, JobError> {
        Ok(self.queue.error_of(id).await?)
    }

    async fn track(&self, record: &JobRecord) -> Result<(), StoreError> {
        self.store.put(record, METADATA_TTL_SECS).await?;
        self.store.push_recent(&record.id, RECENCY_CAP).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::RESULT_TTL_SECS;
    use crate::queue::{MemoryJobQueue, SequentialIds};
    use crate::store::MemoryRecordStore;
    use crate::testing::{DownQueue, DownStore};
    use crate::url_policy::UrlPolicy;

    const START: i64 = 1_700_000_000;

    struct Fixture {
        manager: JobManager,
        queue: Arc<MemoryJobQueue>,
        store: Arc<MemoryRecordStore>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(START));
        let queue = Arc::new(MemoryJobQueue::new(
            clock.clone(),
            Arc::new(SequentialIds::new()),
            RESULT_TTL_SECS,
        ));
        let store = Arc::new(MemoryRecordStore::new(clock.clone()));
        let manager = JobManager::new(
            queue.clone(),
            store.clone(),
            Arc::new(UrlPolicy::default()),
            clock,
        );
        Fixture {
            manager,
            queue,
            store,
        }
    }

    #[tokio::test]
    async fn submit_records_metadata_and_recency() {
        let f = fixture();
        let id = f
            .manager
            .submit(&SubmitRequest::new("http://www.youtube.com/watch?v=abc"))
            .await
            .unwrap();
        assert_eq!(id, "job-1");

        let record = f.store.get(&id).await.unwrap().unwrap();
        assert_eq!(
            record,
            JobRecord {
                id: id.clone(),
                request_url: "https://www.youtube.com/watch?v=abc".to_string(),
                submitted_at: START,
                display_title: PLACEHOLDER_TITLE.to_string(),
            }
        );
        assert_eq!(f.store.recent_ids().await.unwrap(), vec![id.clone()]);
        assert_eq!(f.manager.job_status(&id).await.unwrap(), JobStatus::Queued);
    }

    #[tokio::test]
    async fn missing_field_is_invalid_input() {
        let f = fixture();
        let err = f.manager.submit(&SubmitRequest::default()).await.unwrap_err();
        assert!(matches!(err, JobError::InvalidInput));
        assert!(f.store.recent_ids().await.unwrap().is_empty());
        assert!(f.queue.claim_next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejected_url_mutates_nothing() {
        let f = fixture();
        let err = f
            .manager
            .submit(&SubmitRequest::new("ftp://example.com/x"))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::RejectedUrl(ref u) if u == "ftp://example.com/x"));
        assert!(f.store.recent_ids().await.unwrap().is_empty());
        assert!(f.queue.claim_next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_url_is_rejected_not_missing() {
        let f = fixture();
        let err = f.manager.submit(&SubmitRequest::new("")).await.unwrap_err();
        assert!(matches!(err, JobError::RejectedUrl(_)));
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let f = fixture();
        let err = f.manager.job_status("job-404").await.unwrap_err();
        assert!(matches!(err, JobError::NotFound(ref id) if id == "job-404"));
    }

    #[tokio::test]
    async fn store_failure_after_enqueue_is_retryable_and_job_stays_queued() {
        let clock = Arc::new(ManualClock::new(START));
        let queue = Arc::new(MemoryJobQueue::new(
            clock.clone(),
            Arc::new(SequentialIds::new()),
            RESULT_TTL_SECS,
        ));
        let manager = JobManager::new(
            queue.clone(),
            Arc::new(DownStore),
            Arc::new(UrlPolicy::default()),
            clock,
        );
        let err = manager
            .submit(&SubmitRequest::new("https://youtu.be/x"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        // No compensating dequeue.
        assert_eq!(queue.status("job-1").await.unwrap(), Some(JobStatus::Queued));
    }

    #[tokio::test]
    async fn queue_failure_leaves_store_and_index_untouched() {
        let clock = Arc::new(ManualClock::new(START));
        let store = Arc::new(MemoryRecordStore::new(clock.clone()));
        let manager = JobManager::new(
            Arc::new(DownQueue),
            store.clone(),
            Arc::new(UrlPolicy::default()),
            clock.clone(),
        );
        let err = manager
            .submit(&SubmitRequest::new("https://youtu.be/x"))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::StoreUnavailable(_)));
        assert!(err.is_retryable());
        assert!(store.recent_ids().await.unwrap().is_empty());
        // Nothing was written: once every possible record has expired, there is nothing to purge.
        clock.advance(METADATA_TTL_SECS);
        assert_eq!(store.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failure_message_is_reported_for_failed_jobs() {
        let f = fixture();
        let id = f
            .manager
            .submit(&SubmitRequest::new("https://youtu.be/x"))
            .await
            .unwrap();
        assert_eq!(f.manager.job_error(&id).await.unwrap(), None);
        f.queue.claim_next().await.unwrap();
        f.queue.mark_failed(&id, "HTTP Error 410").await.unwrap();
        assert_eq!(f.manager.job_status(&id).await.unwrap(), JobStatus::Failed);
        assert_eq!(
            f.manager.job_error(&id).await.unwrap().as_deref(),
            Some("HTTP Error 410")
        );
    }
}
