//! Background worker: claims queued jobs and runs the downloader.
//!
//! Keeps up to `workers` jobs in flight at once; when one finishes the next
//! queued job is claimed. Expired records are purged whenever the pool goes
//! idle, and at least once per housekeeping interval while it is busy.

mod downloader;

pub use downloader::{Downloaded, Downloader, YtDlp};

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::queue::JobQueue;
use crate::store::RecordStore;
use crate::types::ClaimedJob;

/// Upper bound between purges while jobs keep the pool busy.
pub const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(60);

pub struct WorkerPool {
    queue: Arc<dyn JobQueue>,
    store: Arc<dyn RecordStore>,
    downloader: Arc<dyn Downloader>,
    download_dir: PathBuf,
    workers: usize,
    poll_interval: Duration,
    housekeeping_interval: Duration,
}

impl WorkerPool {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        store: Arc<dyn RecordStore>,
        downloader: Arc<dyn Downloader>,
        download_dir: PathBuf,
        workers: usize,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            store,
            downloader,
            download_dir,
            workers: workers.max(1),
            poll_interval,
            housekeeping_interval: HOUSEKEEPING_INTERVAL,
        }
    }

    pub fn with_housekeeping_interval(mut self, interval: Duration) -> Self {
        self.housekeeping_interval = interval;
        self
    }

    /// Runs until `shutdown` turns true (or its sender is dropped), then waits
    /// for in-flight jobs. Returns the number of jobs run.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<u32> {
        let recovered = self.queue.recover_running().await?;
        if recovered > 0 {
            tracing::info!("recovered {} job(s) from previous run", recovered);
        }

        let mut run_count = 0u32;
        let mut join_set = JoinSet::new();
        let mut stopping = *shutdown.borrow();
        let mut last_purge = Instant::now();

        loop {
            if !stopping {
                while join_set.len() < self.workers {
                    let claimed = match self.queue.claim_next().await {
                        Ok(Some(job)) => job,
                        Ok(None) => break,
                        Err(e) => {
                            tracing::warn!(error = %e, "cannot claim next job");
                            break;
                        }
                    };
                    tracing::info!(job_id = %claimed.id, url = %claimed.task.url, "claimed job");
                    join_set.spawn(run_job(
                        Arc::clone(&self.queue),
                        Arc::clone(&self.store),
                        Arc::clone(&self.downloader),
                        self.download_dir.clone(),
                        claimed,
                    ));
                }
            }

            if join_set.is_empty() && stopping {
                break;
            }
            if !stopping
                && (join_set.is_empty() || last_purge.elapsed() >= self.housekeeping_interval)
            {
                self.housekeeping().await;
                last_purge = Instant::now();
            }

            tokio::select! {
                Some(res) = join_set.join_next() => {
                    run_count += 1;
                    if let Err(e) = res {
                        tracing::error!("job task join: {}", e);
                    }
                }
                changed = shutdown.changed(), if !stopping => {
                    stopping = changed.is_err() || *shutdown.borrow();
                    if stopping {
                        tracing::info!(in_flight = join_set.len(), "worker shutting down");
                    }
                }
                _ = tokio::time::sleep(self.poll_interval), if !stopping => {}
            }
        }

        Ok(run_count)
    }

    async fn housekeeping(&self) {
        match self.store.purge_expired().await {
            Ok(0) => {}
            Ok(n) => tracing::debug!("purged {} expired job record(s)", n),
            Err(e) => tracing::warn!(error = %e, "purging job records failed"),
        }
        match self.queue.purge_expired().await {
            Ok(0) => {}
            Ok(n) => tracing::debug!("purged {} expired queue result(s)", n),
            Err(e) => tracing::warn!(error = %e, "purging queue results failed"),
        }
    }
}

/// Runs one claimed job to completion and reports the outcome to the queue.
async fn run_job(
    queue: Arc<dyn JobQueue>,
    store: Arc<dyn RecordStore>,
    downloader: Arc<dyn Downloader>,
    download_dir: PathBuf,
    job: ClaimedJob,
) {
    let ClaimedJob { id, task } = job;
    match downloader.download(&task, &download_dir).await {
        Ok(done) => {
            if let Some(title) = done.title {
                match store.set_title(&id, &title).await {
                    Ok(true) => tracing::debug!(job_id = %id, title = %title, "title updated"),
                    Ok(false) => tracing::debug!(job_id = %id, "no record to title"),
                    Err(e) => tracing::warn!(job_id = %id, error = %e, "title update failed"),
                }
            }
            if let Err(e) = queue.mark_finished(&id).await {
                tracing::error!(job_id = %id, error = %e, "cannot mark job finished");
                return;
            }
            tracing::info!(job_id = %id, "job finished");
        }
        Err(e) => {
            let message = format!("{e:#}");
            tracing::warn!(job_id = %id, error = %message, "job failed");
            if let Err(e) = queue.mark_failed(&id, &message).await {
                tracing::error!(job_id = %id, error = %e, "cannot mark job failed");
            }
        }
    }
}
