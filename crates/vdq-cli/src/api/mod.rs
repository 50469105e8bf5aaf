//! HTTP API served by `vdq serve`.
//!
//! Routes:
//! - POST /api/enqueue - submit a video URL
//! - GET  /api/status - recent jobs and finished files
//! - GET  /api/jobs/{id} - live status of one job
//! - GET  /download/{*path} - a finished file from the download directory

mod error;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use vdq_core::lifecycle::JobManager;
use vdq_core::services::Services;
use vdq_core::status::StatusAggregator;

pub struct AppState {
    pub manager: Arc<JobManager>,
    pub aggregator: Arc<StatusAggregator>,
    pub download_dir: PathBuf,
}

impl AppState {
    pub fn from_services(services: &Services) -> Arc<Self> {
        Arc::new(Self {
            manager: services.manager.clone(),
            aggregator: services.aggregator.clone(),
            download_dir: services.download_dir.clone(),
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let downloads = ServeDir::new(&state.download_dir);
    Router::new()
        .nest("/api", routes::router())
        .nest_service("/download", downloads)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
