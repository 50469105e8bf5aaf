use std::collections::VecDeque;

use crate::types::JobId;

/// Most-recent-first list of job ids, bounded by the capacity given on each push.
///
/// Entries are never repaired in place: ids whose job has expired stay
/// until newer pushes move them past the capacity.
#[derive(Debug, Default, Clone)]
pub struct RecencyIndex {
    ids: VecDeque<JobId>,
}

impl RecencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `id` (moving it if already present) and trim to `cap` entries.
    /// Returns the evicted ids, oldest last.
    pub fn push(&mut self, id: &str, cap: usize) -> Vec<JobId> {
        if let Some(pos) = self.ids.iter().position(|existing| existing == id) {
            self.ids.remove(pos);
        }
        self.ids.push_front(id.to_string());
        if self.ids.len() > cap {
            self.ids.split_off(cap).into()
        } else {
            Vec::new()
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobId> {
        self.ids.iter()
    }

    pub fn to_vec(&self) -> Vec<JobId> {
        self.ids.iter().cloned().collect()
    }
}
