//! `vdq job <id>` – live status of one job.

use anyhow::Result;
use vdq_core::services::Services;
use vdq_core::types::JobStatus;

pub async fn run_job(services: &Services, id: &str) -> Result<()> {
    let status = services.manager.job_status(id).await?;
    println!("{id} {status}");
    if status == JobStatus::Failed {
        if let Some(error) = services.manager.job_error(id).await? {
            println!("  error: {error}");
        }
    }
    Ok(())
}
