//! `vdq work` – run the worker loop until interrupted.

use anyhow::{Context, Result};
use vdq_core::services::Services;

use super::shutdown_on_ctrl_c;

pub async fn run_work(services: &Services, workers: Option<usize>) -> Result<()> {
    tokio::fs::create_dir_all(&services.download_dir)
        .await
        .with_context(|| format!("create {}", services.download_dir.display()))?;

    let pool = services.worker_pool(workers);
    let (_tx, shutdown) = shutdown_on_ctrl_c();
    let run_count = pool.run(shutdown).await?;

    if run_count == 0 {
        println!("No jobs run.");
    } else {
        tracing::info!("worker completed {} job(s)", run_count);
    }
    Ok(())
}
