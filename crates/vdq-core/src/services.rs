//! Wiring: one set of injected services per process.
//!
//! The HTTP server and worker processes each build their own `Services` from
//! the same config; they share state only through the database file.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::config::{VdqConfig, RESULT_TTL_SECS};
use crate::db::Database;
use crate::lifecycle::JobManager;
use crate::queue::{JobQueue, SqliteJobQueue, UuidIds};
use crate::status::StatusAggregator;
use crate::store::{RecordStore, SqliteRecordStore};
use crate::url_policy::UrlPolicy;
use crate::worker::{WorkerPool, YtDlp};

pub struct Services {
    pub queue: Arc<dyn JobQueue>,
    pub store: Arc<dyn RecordStore>,
    pub manager: Arc<JobManager>,
    pub aggregator: Arc<StatusAggregator>,
    pub download_dir: PathBuf,
    cfg: VdqConfig,
}

impl Services {
    /// SQLite-backed services on the default database.
    pub async fn open(cfg: &VdqConfig) -> Result<Self> {
        let db = Database::open_default().await?;
        Self::with_database(cfg, db)
    }

    pub fn with_database(cfg: &VdqConfig, db: Database) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let queue: Arc<dyn JobQueue> = Arc::new(SqliteJobQueue::new(
            db.clone(),
            clock.clone(),
            Arc::new(UuidIds),
            RESULT_TTL_SECS,
        ));
        let store: Arc<dyn RecordStore> = Arc::new(SqliteRecordStore::new(db, clock.clone()));
        let download_dir = cfg.download_dir()?;
        let manager = Arc::new(JobManager::new(
            queue.clone(),
            store.clone(),
            Arc::new(UrlPolicy::new(&cfg.allowed_hosts)),
            clock.clone(),
        ));
        let aggregator = Arc::new(StatusAggregator::new(
            queue.clone(),
            store.clone(),
            clock,
            download_dir.clone(),
            cfg.file_extension.clone(),
        ));
        Ok(Self {
            queue,
            store,
            manager,
            aggregator,
            download_dir,
            cfg: cfg.clone(),
        })
    }

    /// Worker pool running the configured downloader. `workers` overrides
    /// the configured slot count.
    pub fn worker_pool(&self, workers: Option<usize>) -> WorkerPool {
        WorkerPool::new(
            self.queue.clone(),
            self.store.clone(),
            Arc::new(YtDlp::new(&self.cfg.downloader)),
            self.download_dir.clone(),
            workers.unwrap_or(self.cfg.workers),
            Duration::from_millis(self.cfg.poll_interval_ms),
        )
    }
}
