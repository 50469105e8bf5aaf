use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::JobId;

/// Generator of unique job ids.
pub trait JobIdSource: Send + Sync {
    fn next_id(&self) -> JobId;
}

/// Random UUID v4 ids (production).
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl JobIdSource for UuidIds {
    fn next_id(&self) -> JobId {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Predictable ids `job-1`, `job-2`, ... for tests.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobIdSource for SequentialIds {
    fn next_id(&self) -> JobId {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        format!("job-{n}")
    }
}
