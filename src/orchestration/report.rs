// Thu Oct 15 2026 - Alex

use crate::query::QueryRecord;
use crate::retrieval::Severity;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub checked: usize,
    pub queued: usize,
    pub already_queued: usize,
    pub already_fresh: usize,
    pub failed: usize,
}

impl fmt::Display for DiscoveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} checked, {} newly queued, {} already queued, {} up to date, {} failed",
            self.checked, self.queued, self.already_queued, self.already_fresh, self.failed
        )
    }
}

#[derive(Debug, Clone)]
pub struct DrainFailure {
    pub record: QueryRecord,
    pub severity: Severity,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct DrainReport {
    pub completed: usize,
    pub left_pending: usize,
    pub dropped: usize,
    pub failures: Vec<DrainFailure>,
}

impl DrainReport {
    pub fn attempted(&self) -> usize {
        self.completed + self.left_pending + self.dropped
    }
}

impl fmt::Display for DrainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} completed, {} left pending, {} dropped",
            self.completed, self.left_pending, self.dropped
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Drain of the backlog found at startup, when resuming first.
    pub resumed: Option<DrainReport>,
    pub discovery: Option<DiscoveryReport>,
    pub drain: DrainReport,
}

impl RunReport {
    pub fn total_completed(&self) -> usize {
        self.resumed.as_ref().map(|r| r.completed).unwrap_or(0) + self.drain.completed
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(resumed) = &self.resumed {
            writeln!(f, "Resumed: {}", resumed)?;
        }
        if let Some(discovery) = &self.discovery {
            writeln!(f, "Discovery: {}", discovery)?;
        }
        write!(f, "Drain: {}", self.drain)
    }
}
