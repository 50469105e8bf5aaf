//! Status aggregator: read-side join of the recency index, job metadata and
//! live queue status, plus the recent-file listing.
//!
//! Owns no state and never writes. Ids the queue no longer knows are
//! omitted; stale index entries are left in place.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::JobError;
use crate::files::{list_recent_files, DownloadedFile};
use crate::humanize::relative_time;
use crate::queue::JobQueue;
use crate::store::RecordStore;
use crate::types::{JobId, JobStatus};

/// One row of the recent-jobs view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobView {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_url: Option<String>,
    /// Relative submission time, rendered at read time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub jobs: Vec<JobView>,
    pub files: Vec<DownloadedFile>,
}

pub struct StatusAggregator {
    queue: Arc<dyn JobQueue>,
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    download_dir: PathBuf,
    file_extension: String,
}

impl StatusAggregator {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        download_dir: PathBuf,
        file_extension: impl Into<String>,
    ) -> Self {
        Self {
            queue,
            store,
            clock,
            download_dir,
            file_extension: file_extension.into(),
        }
    }

    pub async fn snapshot(&self) -> Result<Snapshot, JobError> {
        let jobs = self.jobs().await?;
        let files = self.files().await?;
        Ok(Snapshot { jobs, files })
    }

    /// Recent jobs, newest first, that the queue still knows about.
    pub async fn jobs(&self) -> Result<Vec<JobView>, JobError> {
        let now = self.clock.now();
        let mut out = Vec::new();
        for id in self.store.recent_ids().await? {
            let Some(status) = self.queue.status(&id).await? else {
                tracing::trace!(job_id = %id, "queue forgot job, omitting");
                continue;
            };
            let view = match self.store.get(&id).await? {
                Some(record) => JobView {
                    job_id: id,
                    status,
                    request_url: Some(record.request_url),
                    submitted: Some(relative_time(now - record.submitted_at)),
                    page_title: Some(record.display_title),
                },
                None => JobView {
                    job_id: id,
                    status,
                    request_url: None,
                    submitted: None,
                    page_title: None,
                },
            };
            out.push(view);
        }
        Ok(out)
    }

    /// Finished artifacts in the download directory, newest first.
    pub async fn files(&self) -> Result<Vec<DownloadedFile>, JobError> {
        let dir = self.download_dir.clone();
        let extension = self.file_extension.clone();
        let now = self.clock.now();
        let listed = tokio::task::spawn_blocking(move || list_recent_files(&dir, &extension, now))
            .await
            .map_err(std::io::Error::other)
            .and_then(|r| r);
        listed.map_err(|source| JobError::FilesUnavailable {
            path: self.download_dir.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::{METADATA_TTL_SECS, RESULT_TTL_SECS};
    use crate::queue::{MemoryJobQueue, SequentialIds};
    use crate::store::MemoryRecordStore;
    use crate::error::StoreError;
    use crate::testing::{DownQueue, DownStore};
    use crate::types::{DownloadTask, JobRecord};

    const START: i64 = 1_700_000_000;

    struct Fixture {
        clock: Arc<ManualClock>,
        queue: Arc<MemoryJobQueue>,
        store: Arc<MemoryRecordStore>,
        aggregator: StatusAggregator,
        dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(START));
        let queue = Arc::new(MemoryJobQueue::new(
            clock.clone(),
            Arc::new(SequentialIds::new()),
            RESULT_TTL_SECS,
        ));
        let store = Arc::new(MemoryRecordStore::new(clock.clone()));
        let dir = tempfile::tempdir().unwrap();
        let aggregator = StatusAggregator::new(
            queue.clone(),
            store.clone(),
            clock.clone(),
            dir.path().to_path_buf(),
            "mp4",
        );
        Fixture {
            clock,
            queue,
            store,
            aggregator,
            dir,
        }
    }

    async fn add_job(f: &Fixture, url: &str) -> JobId {
        let id = f
            .queue
            .enqueue(DownloadTask {
                url: url.to_string(),
            })
            .await
            .unwrap();
        let record = JobRecord {
            id: id.clone(),
            request_url: url.to_string(),
            submitted_at: f.clock.now(),
            display_title: "...".to_string(),
        };
        f.store.put(&record, METADATA_TTL_SECS).await.unwrap();
        f.store.push_recent(&id, 10).await.unwrap();
        id
    }

    #[tokio::test]
    async fn joins_metadata_and_live_status() {
        let f = fixture();
        let a = add_job(&f, "https://youtu.be/a").await;
        f.clock.advance(30);
        let b = add_job(&f, "https://youtu.be/b").await;
        f.queue.claim_next().await.unwrap();
        f.clock.advance(5);

        let jobs = f.aggregator.jobs().await.unwrap();
        assert_eq!(
            jobs,
            vec![
                JobView {
                    job_id: b,
                    status: JobStatus::Queued,
                    request_url: Some("https://youtu.be/b".to_string()),
                    submitted: Some("5 seconds ago".to_string()),
                    page_title: Some("...".to_string()),
                },
                JobView {
                    job_id: a,
                    status: JobStatus::Running,
                    request_url: Some("https://youtu.be/a".to_string()),
                    submitted: Some("35 seconds ago".to_string()),
                    page_title: Some("...".to_string()),
                },
            ]
        );
    }

    #[tokio::test]
    async fn omits_jobs_the_queue_forgot() {
        let f = fixture();
        let a = add_job(&f, "https://youtu.be/a").await;
        f.queue.claim_next().await.unwrap();
        f.queue.mark_finished(&a).await.unwrap();
        let b = add_job(&f, "https://youtu.be/b").await;

        f.clock.advance(RESULT_TTL_SECS + 1);
        let jobs = f.aggregator.jobs().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_id, b);
        // Metadata and the index entry are untouched.
        assert!(f.store.get(&a).await.unwrap().is_some());
        assert!(f.store.recent_ids().await.unwrap().contains(&a));
    }

    #[tokio::test]
    async fn synthesizes_view_when_metadata_missing() {
        let f = fixture();
        let id = f
            .queue
            .enqueue(DownloadTask {
                url: "https://youtu.be/x".to_string(),
            })
            .await
            .unwrap();
        f.store.push_recent(&id, 10).await.unwrap();

        let jobs = f.aggregator.jobs().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status, JobStatus::Queued);
        assert!(jobs[0].request_url.is_none());
        let json = serde_json::to_value(&jobs[0]).unwrap();
        assert_eq!(json, serde_json::json!({"job_id": id, "status": "queued"}));
    }

    #[tokio::test]
    async fn repeated_snapshots_are_stable() {
        let f = fixture();
        for n in 0..3 {
            add_job(&f, &format!("https://youtu.be/{n}")).await;
        }
        let first = f.aggregator.snapshot().await.unwrap();
        let second = f.aggregator.snapshot().await.unwrap();
        let ids = |s: &Snapshot| s.jobs.iter().map(|j| j.job_id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(ids(&first), vec!["job-3", "job-2", "job-1"]);
    }

    #[tokio::test]
    async fn snapshot_includes_files() {
        let f = fixture();
        std::fs::write(f.dir.path().join("clip.mp4"), b"data").unwrap();
        let snap = f.aggregator.snapshot().await.unwrap();
        assert!(snap.jobs.is_empty());
        assert_eq!(snap.files.len(), 1);
        assert_eq!(snap.files[0].name, "clip.mp4");
        assert_eq!(snap.files[0].size, "4.0B");
    }

    #[tokio::test]
    async fn missing_download_dir_is_an_error() {
        let clock = Arc::new(ManualClock::new(START));
        let aggregator = StatusAggregator::new(
            Arc::new(MemoryJobQueue::new(
                clock.clone(),
                Arc::new(SequentialIds::new()),
                RESULT_TTL_SECS,
            )),
            Arc::new(MemoryRecordStore::new(clock.clone())),
            clock,
            PathBuf::from("/definitely/not/here"),
            "mp4",
        );
        let err = aggregator.snapshot().await.unwrap_err();
        assert!(matches!(err, JobError::FilesUnavailable { .. }));
        assert!(!err.is_retryable());
    }

    fn aggregator_over(queue: Arc<dyn JobQueue>, store: Arc<dyn RecordStore>) -> StatusAggregator {
        StatusAggregator::new(
            queue,
            store,
            Arc::new(ManualClock::new(START)),
            std::env::temp_dir(),
            "mp4",
        )
    }

    #[tokio::test]
    async fn failing_store_is_an_error_not_an_empty_list() {
        let clock = Arc::new(ManualClock::new(START));
        let queue = Arc::new(MemoryJobQueue::new(
            clock,
            Arc::new(SequentialIds::new()),
            RESULT_TTL_SECS,
        ));
        let aggregator = aggregator_over(queue, Arc::new(DownStore));

        let err = aggregator.jobs().await.unwrap_err();
        assert!(matches!(err, JobError::StoreUnavailable(_)));
        assert!(err.is_retryable());
        let err = aggregator.snapshot().await.unwrap_err();
        assert!(matches!(err, JobError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn failing_queue_is_an_error_not_an_omission() {
        let clock = Arc::new(ManualClock::new(START));
        let store = Arc::new(MemoryRecordStore::new(clock));
        store.push_recent("job-1", 10).await.unwrap();
        let aggregator = aggregator_over(Arc::new(DownQueue), store);

        let err = aggregator.snapshot().await.unwrap_err();
        assert!(matches!(err, JobError::StoreUnavailable(_)));
        assert!(err.is_retryable());
    }

    /// Index and queue work, but record lookups fail.
    struct RecordsDown(MemoryRecordStore);

    #[async_trait::async_trait]
    impl RecordStore for RecordsDown {
        async fn put(&self, r: &JobRecord, ttl: i64) -> Result<(), StoreError> {
            self.0.put(r, ttl).await
        }
        async fn get(&self, id: &str) -> Result<Option<JobRecord>, StoreError> {
            DownStore.get(id).await
        }
        async fn set_title(&self, id: &str, t: &str) -> Result<bool, StoreError> {
            self.0.set_title(id, t).await
        }
        async fn push_recent(&self, id: &str, cap: usize) -> Result<(), StoreError> {
            self.0.push_recent(id, cap).await
        }
        async fn recent_ids(&self) -> Result<Vec<JobId>, StoreError> {
            self.0.recent_ids().await
        }
        async fn purge_expired(&self) -> Result<u64, StoreError> {
            self.0.purge_expired().await
        }
    }

    #[tokio::test]
    async fn failing_record_lookup_is_an_error() {
        let clock = Arc::new(ManualClock::new(START));
        let queue = Arc::new(MemoryJobQueue::new(
            clock.clone(),
            Arc::new(SequentialIds::new()),
            RESULT_TTL_SECS,
        ));
        let id = queue
            .enqueue(DownloadTask {
                url: "https://youtu.be/x".to_string(),
            })
            .await
            .unwrap();
        let store = RecordsDown(MemoryRecordStore::new(clock));
        store.push_recent(&id, 10).await.unwrap();
        let aggregator = aggregator_over(queue, Arc::new(store));

        let err = aggregator.jobs().await.unwrap_err();
        assert!(matches!(err, JobError::StoreUnavailable(_)));
    }
}
