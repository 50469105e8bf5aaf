//! Error taxonomy for the job lifecycle.
//!
//! Validation errors (`InvalidInput`, `RejectedUrl`) are terminal. Store and
//! queue failures stay distinguishable from "legitimately absent" so callers
//! can decide whether to retry.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::JobId;

/// Failure talking to the record store or the job queue.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Backend-specific failure without an underlying SQL error.
    #[error("{0}")]
    Unavailable(String),
}

/// Errors surfaced by the lifecycle manager and the status aggregator.
#[derive(Debug, Error)]
pub enum JobError {
    /// Required `input_url` field absent from the submission.
    #[error("the URL to download must be provided as 'input_url'")]
    InvalidInput,
    /// Well-formed submission whose URL fails the validity predicate.
    #[error("rejected URL: {0}")]
    RejectedUrl(String),
    #[error("no info for job {0}, probably deleted")]
    NotFound(JobId),
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error("cannot list download directory {}: {source}", path.display())]
    FilesUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl JobError {
    /// True when the same call may succeed later (connectivity failure).
    pub fn is_retryable(&self) -> bool {
        matches!(self, JobError::StoreUnavailable(_))
    }
}
