// Wed Oct 14 2026 - Alex

use super::error::{StoreError, StoreResult};
use crate::config::Config;
use crate::query::QueryRecord;
use crate::utils::fs::{read_optional, write_atomic};
use std::path::{Path, PathBuf};

/// Durable, duplicate-free, insertion-ordered backlog of queries. Every
/// mutation reloads the snapshot and rewrites it in full.
pub struct PendingQueue {
    path: PathBuf,
}

impl PendingQueue {
    pub fn new(config: &Config) -> Self {
        Self::at(config.queue_path())
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Empty when no snapshot has been written yet.
    pub fn load(&self) -> StoreResult<Vec<QueryRecord>> {
        let text = match read_optional(&self.path).map_err(|e| StoreError::io(&self.path, e))? {
            Some(text) => text,
            None => return Ok(Vec::new()),
        };

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&text).map_err(|e| StoreError::CorruptQueue {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    pub fn persist(&self, queries: &[QueryRecord]) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(queries).map_err(|e| StoreError::CorruptQueue {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        write_atomic(&self.path, &json).map_err(|e| StoreError::io(&self.path, e))
    }

    /// Appends unless an equal query is already queued. Returns whether the
    /// queue changed.
    pub fn enqueue(&self, query: &QueryRecord) -> StoreResult<bool> {
        let mut queries = self.load()?;
        if queries.contains(query) {
            log::debug!("Already queued: {}", query);
            return Ok(false);
        }

        queries.push(query.clone());
        self.persist(&queries)?;
        log::info!("Queued {}", query);
        Ok(true)
    }

    /// Removes the first equal query. Removing something that is not queued
    /// is a logic error and fails with `NotQueued`.
    pub fn dequeue(&self, query: &QueryRecord) -> StoreResult<()> {
        let mut queries = self.load()?;
        let index = queries
            .iter()
            .position(|q| q == query)
            .ok_or_else(|| StoreError::NotQueued(query.clone()))?;

        queries.remove(index);
        self.persist(&queries)?;
        log::info!("Dequeued {}", query);
        Ok(())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.load()?.is_empty())
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.load()?.len())
    }

    pub fn contains(&self, query: &QueryRecord) -> StoreResult<bool> {
        Ok(self.load()?.contains(query))
    }
}
