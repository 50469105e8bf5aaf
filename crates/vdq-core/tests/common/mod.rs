//! Shared harness: the full core wired over either backend with a manual clock.

use std::sync::Arc;

use tempfile::TempDir;
use vdq_core::clock::ManualClock;
use vdq_core::config::RESULT_TTL_SECS;
use vdq_core::db::Database;
use vdq_core::lifecycle::JobManager;
use vdq_core::queue::{JobQueue, MemoryJobQueue, SequentialIds, SqliteJobQueue};
use vdq_core::status::StatusAggregator;
use vdq_core::store::{MemoryRecordStore, RecordStore, SqliteRecordStore};
use vdq_core::url_policy::UrlPolicy;

pub const START: i64 = 1_700_000_000;

#[derive(Debug, Clone, Copy)]
pub enum Backend {
    Memory,
    Sqlite,
}

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub queue: Arc<dyn JobQueue>,
    pub store: Arc<dyn RecordStore>,
    pub manager: JobManager,
    pub aggregator: StatusAggregator,
    pub dir: TempDir,
}

impl Harness {
    pub async fn new(backend: Backend) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(START));
        let ids = Arc::new(SequentialIds::new());
        let (queue, store): (Arc<dyn JobQueue>, Arc<dyn RecordStore>) = match backend {
            Backend::Memory => (
                Arc::new(MemoryJobQueue::new(clock.clone(), ids, RESULT_TTL_SECS)),
                Arc::new(MemoryRecordStore::new(clock.clone())),
            ),
            Backend::Sqlite => {
                let db = Database::open_at(dir.path().join("vdq.db")).await.unwrap();
                (
                    Arc::new(SqliteJobQueue::new(
                        db.clone(),
                        clock.clone(),
                        ids,
                        RESULT_TTL_SECS,
                    )),
                    Arc::new(SqliteRecordStore::new(db, clock.clone())),
                )
            }
        };
        let manager = JobManager::new(
            queue.clone(),
            store.clone(),
            Arc::new(UrlPolicy::default()),
            clock.clone(),
        );
        let aggregator = StatusAggregator::new(
            queue.clone(),
            store.clone(),
            clock.clone(),
            dir.path().to_path_buf(),
            "mp4",
        );
        Self {
            clock,
            queue,
            store,
            manager,
            aggregator,
            dir,
        }
    }
}
