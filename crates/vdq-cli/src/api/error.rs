use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use vdq_core::error::JobError;

/// JSON body of every API error.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            info: None,
        }
    }

    pub fn with_info(error: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            info: Some(info.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Job(#[from] JobError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::Job(err) = &self;
        let (status, body) = match err {
            JobError::InvalidInput => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("The video URL to download must be provided as 'input_url'"),
            ),
            JobError::RejectedUrl(_) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::with_info(
                    "Sorry, that doesn't look like a supported video URL.",
                    "Please try again using a link starting with 'https://www.youtube.com'.",
                ),
            ),
            JobError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("No info, probably deleted."),
            ),
            JobError::StoreUnavailable(source) => {
                tracing::error!(error = %source, "job store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new("Job store unavailable, try again later."),
                )
            }
            JobError::FilesUnavailable { path, source } => {
                tracing::error!(path = %path.display(), error = %source, "download directory unreadable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Download directory unavailable."),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::path::PathBuf;
    use vdq_core::error::StoreError;

    async fn extract(err: JobError) -> (StatusCode, ErrorResponse) {
        let response = ApiError::from(err).into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn rejected_url_is_forbidden_with_info() {
        let (status, body) = extract(JobError::RejectedUrl("ftp://x".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.info.is_some());
    }

    #[tokio::test]
    async fn store_failure_is_service_unavailable() {
        let err = JobError::StoreUnavailable(StoreError::Unavailable("down".into()));
        let (status, body) = extract(err).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.info.is_none());
    }

    #[tokio::test]
    async fn unreadable_directory_is_internal_error() {
        let err = JobError::FilesUnavailable {
            path: PathBuf::from("/nope"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let (status, body) = extract(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        // Paths stay in the log, not the response.
        assert!(!body.error.contains("/nope"));
    }
}
