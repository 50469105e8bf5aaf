use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use vdq_core::status::Snapshot;
use vdq_core::types::{JobId, JobStatus, SubmitRequest};

use super::error::ApiResult;
use super::AppState;

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct EnqueueResponse {
    pub job_id: JobId,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct JobStatusResponse {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/enqueue - submit `{"input_url": "..."}`.
///
/// A body that is not a JSON object counts as a missing field.
pub async fn enqueue(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<EnqueueResponse>)> {
    let req: SubmitRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "unparseable enqueue body");
        SubmitRequest::default()
    });
    let job_id = state.manager.submit(&req).await?;
    Ok((StatusCode::CREATED, Json(EnqueueResponse { job_id })))
}

/// GET /api/status - recent jobs and finished files.
pub async fn status(State(state): State<Arc<AppState>>) -> ApiResult<Json<Snapshot>> {
    Ok(Json(state.aggregator.snapshot().await?))
}

/// GET /api/jobs/{id} - live status of one job, with the failure message
/// when it failed.
pub async fn job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobStatusResponse>> {
    let status = state.manager.job_status(&id).await?;
    let error = match status {
        JobStatus::Failed => state.manager.job_error(&id).await?,
        _ => None,
    };
    Ok(Json(JobStatusResponse { status, error }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/enqueue", post(enqueue))
        .route("/status", get(status))
        .route("/jobs/{id}", get(job))
}
