//! Types shared by the record store, the job queue and the read side.

use serde::{Deserialize, Serialize};

/// Job identifier, assigned by the queue at enqueue time.
pub type JobId = String;

/// Live execution state of a job, as reported by the queue.
///
/// Never stored on the job record; always read from the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
    Failed,
    Unknown,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Finished => "finished",
            JobStatus::Failed => "failed",
            JobStatus::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "queued" => JobStatus::Queued,
            "running" => JobStatus::Running,
            "finished" => JobStatus::Finished,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Unknown,
        }
    }

    /// Finished or failed: the queue starts its result retention clock.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Unit of work handed to the queue: fetch this (already normalized) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
}

/// A queued task handed to a worker by `JobQueue::claim_next`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedJob {
    pub id: JobId,
    pub task: DownloadTask,
}

/// Per-job metadata held by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub request_url: String,
    /// Unix seconds.
    pub submitted_at: i64,
    pub display_title: String,
}

/// Submission payload as received from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub input_url: Option<String>,
}

impl SubmitRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            input_url: Some(url.into()),
        }
    }
}
