//! `vdq status` – recent jobs and finished files.

use anyhow::Result;
use vdq_core::services::Services;

pub async fn run_status(services: &Services) -> Result<()> {
    let snapshot = services.aggregator.snapshot().await?;

    if snapshot.jobs.is_empty() {
        println!("No recent jobs.");
    } else {
        println!("{:<38} {:<9} {:<16} {}", "ID", "STATUS", "SUBMITTED", "TITLE / URL");
        for j in &snapshot.jobs {
            let label = match (&j.page_title, &j.request_url) {
                (Some(title), Some(url)) => format!("{title}  {url}"),
                _ => "-".to_string(),
            };
            println!(
                "{:<38} {:<9} {:<16} {}",
                j.job_id,
                j.status,
                j.submitted.as_deref().unwrap_or("-"),
                label
            );
        }
    }

    println!();
    if snapshot.files.is_empty() {
        println!("No downloaded files in {}.", services.download_dir.display());
    } else {
        println!("{:<8} {:<16} {}", "SIZE", "MODIFIED", "FILE");
        for f in &snapshot.files {
            println!("{:<8} {:<16} {}", f.size, f.modified, f.name);
        }
    }
    Ok(())
}
