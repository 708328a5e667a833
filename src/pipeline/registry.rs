//! Job id → latest tree registry
//!
//! @module pipeline/registry

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::trace::TraceTree;

/// Concurrent map of published trees; only successful jobs publish
#[derive(Debug, Default)]
pub struct JobRegistry {
    trees: RwLock<HashMap<String, Arc<TraceTree>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a tree, replacing any earlier tree of the same job
    pub fn publish(&self, job_id: impl Into<String>, tree: Arc<TraceTree>) -> Option<Arc<TraceTree>> {
        self.trees.write().insert(job_id.into(), tree)
    }

    pub fn get(&self, job_id: &str) -> Option<Arc<TraceTree>> {
        self.trees.read().get(job_id).cloned()
    }

    pub fn remove(&self, job_id: &str) -> Option<Arc<TraceTree>> {
        self.trees.write().remove(job_id)
    }

    /// Published job ids, sorted
    pub fn job_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.trees.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.trees.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.read().is_empty()
    }
}
