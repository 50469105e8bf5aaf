//! In-process job queue, FIFO over a mutex. Used as a fake in tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{JobIdSource, JobQueue};
use crate::clock::Clock;
use crate::error::StoreError;
use crate::types::{ClaimedJob, DownloadTask, JobId, JobStatus};

struct Entry {
    task: DownloadTask,
    state: JobStatus,
    ended_at: Option<i64>,
    error: Option<String>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<JobId, Entry>,
    pending: VecDeque<JobId>,
}

pub struct MemoryJobQueue {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn JobIdSource>,
    result_ttl_secs: i64,
    inner: Mutex<Inner>,
}

impl MemoryJobQueue {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn JobIdSource>, result_ttl_secs: i64) -> Self {
        Self {
            clock,
            ids,
            result_ttl_secs,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("job queue lock poisoned".to_string()))
    }

    fn expired(&self, entry: &Entry, now: i64) -> bool {
        entry
            .ended_at
            .is_some_and(|ended| ended + self.result_ttl_secs <= now)
    }

    fn end(&self, id: &str, state: JobStatus, error: Option<String>) -> Result<(), StoreError> {
        let now = self.clock.now();
        let mut inner = self.lock()?;
        if let Some(entry) = inner.entries.get_mut(id) {
            entry.state = state;
            entry.ended_at = Some(now);
            entry.error = error;
        }
        Ok(())
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn enqueue(&self, task: DownloadTask) -> Result<JobId, StoreError> {
        let id = self.ids.next_id();
        let mut inner = self.lock()?;
        inner.entries.insert(
            id.clone(),
            Entry {
                task,
                state: JobStatus::Queued,
                ended_at: None,
                error: None,
            },
        );
        inner.pending.push_back(id.clone());
        Ok(id)
    }

    async fn status(&self, id: &str) -> Result<Option<JobStatus>, StoreError> {
        let now = self.clock.now();
        Ok(self
            .lock()?
            .entries
            .get(id)
            .filter(|entry| !self.expired(entry, now))
            .map(|entry| entry.state))
    }

    async fn claim_next(&self) -> Result<Option<ClaimedJob>, StoreError> {
        let mut inner = self.lock()?;
        while let Some(id) = inner.pending.pop_front() {
            if let Some(entry) = inner.entries.get_mut(&id) {
                if entry.state == JobStatus::Queued {
                    entry.state = JobStatus::Running;
                    return Ok(Some(ClaimedJob {
                        task: entry.task.clone(),
                        id,
                    }));
                }
            }
        }
        Ok(None)
    }

    async fn error_of(&self, id: &str) -> Result<Option<String>, StoreError> {
        let now = self.clock.now();
        Ok(self
            .lock()?
            .entries
            .get(id)
            .filter(|entry| !self.expired(entry, now))
            .and_then(|entry| entry.error.clone()))
    }

    async fn mark_finished(&self, id: &str) -> Result<(), StoreError> {
        self.end(id, JobStatus::Finished, None)
    }

    async fn mark_failed(&self, id: &str, message: &str) -> Result<(), StoreError> {
        self.end(id, JobStatus::Failed, Some(message.to_string()))
    }

    async fn recover_running(&self) -> Result<u64, StoreError> {
        let mut inner = self.lock()?;
        let Inner { entries, pending } = &mut *inner;
        let mut stranded: Vec<JobId> = entries
            .iter_mut()
            .filter(|(_, entry)| entry.state == JobStatus::Running)
            .map(|(id, entry)| {
                entry.state = JobStatus::Queued;
                id.clone()
            })
            .collect();
        stranded.sort();
        let n = stranded.len() as u64;
        for id in stranded.into_iter().rev() {
            pending.push_front(id);
        }
        Ok(n)
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let mut inner = self.lock()?;
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !self.expired(entry, now));
        Ok((before - inner.entries.len()) as u64)
    }
}
