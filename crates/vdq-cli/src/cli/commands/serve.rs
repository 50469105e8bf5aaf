//! `vdq serve` – HTTP API, plus embedded workers when `workers > 0`.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use vdq_core::config::VdqConfig;
use vdq_core::services::Services;

use super::shutdown_on_ctrl_c;
use crate::api::{self, AppState};

pub async fn run_serve(cfg: &VdqConfig, services: &Services, listen: Option<String>) -> Result<()> {
    let addr = listen.unwrap_or_else(|| cfg.listen.clone());
    tokio::fs::create_dir_all(&services.download_dir)
        .await
        .with_context(|| format!("create {}", services.download_dir.display()))?;

    let (_tx, shutdown) = shutdown_on_ctrl_c();

    let worker = if cfg.workers > 0 {
        let pool = services.worker_pool(None);
        let worker_shutdown = shutdown.clone();
        Some(tokio::spawn(async move { pool.run(worker_shutdown).await }))
    } else {
        tracing::info!("no embedded workers; run `vdq work` to process jobs");
        None
    };

    let app = api::router(AppState::from_services(services));
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "HTTP API listening");
    println!("Listening on http://{addr}");

    let mut server_shutdown = shutdown;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            while !*server_shutdown.borrow_and_update() {
                if server_shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await?;

    if let Some(handle) = worker {
        let run_count = handle.await??;
        tracing::info!("embedded workers completed {} job(s)", run_count);
    }
    Ok(())
}
