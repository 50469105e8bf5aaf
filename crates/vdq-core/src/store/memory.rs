//! In-process record store. All state sits behind one mutex, so push-and-trim
//! is atomic with respect to concurrent callers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{RecencyIndex, RecordStore};
use crate::clock::Clock;
use crate::error::StoreError;
use crate::types::{JobId, JobRecord};

struct StoredRecord {
    record: JobRecord,
    expires_at: i64,
}

#[derive(Default)]
struct Inner {
    records: HashMap<JobId, StoredRecord>,
    recent: RecencyIndex,
}

pub struct MemoryRecordStore {
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl MemoryRecordStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("record store lock poisoned".to_string()))
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put(&self, record: &JobRecord, ttl_secs: i64) -> Result<(), StoreError> {
        let expires_at = self.clock.now() + ttl_secs;
        self.lock()?.records.insert(
            record.id.clone(),
            StoredRecord {
                record: record.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<JobRecord>, StoreError> {
        let now = self.clock.now();
        Ok(self
            .lock()?
            .records
            .get(id)
            .filter(|stored| stored.expires_at > now)
            .map(|stored| stored.record.clone()))
    }

    async fn set_title(&self, id: &str, title: &str) -> Result<bool, StoreError> {
        let now = self.clock.now();
        let mut inner = self.lock()?;
        match inner.records.get_mut(id) {
            Some(stored) if stored.expires_at > now => {
                stored.record.display_title = title.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn push_recent(&self, id: &str, cap: usize) -> Result<(), StoreError> {
        self.lock()?.recent.push(id, cap);
        Ok(())
    }

    async fn recent_ids(&self) -> Result<Vec<JobId>, StoreError> {
        Ok(self.lock()?.recent.to_vec())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let mut inner = self.lock()?;
        let before = inner.records.len();
        inner.records.retain(|_, stored| stored.expires_at > now);
        Ok((before - inner.records.len()) as u64)
    }
}
