//! `vdq submit <url>` – submit a video URL.

use anyhow::Result;
use vdq_core::services::Services;
use vdq_core::types::SubmitRequest;

pub async fn run_submit(services: &Services, url: &str) -> Result<()> {
    let id = services.manager.submit(&SubmitRequest::new(url)).await?;
    println!("Submitted job {id} for URL: {url}");
    Ok(())
}
