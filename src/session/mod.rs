// Wed Oct 14 2026 - Alex

pub mod replay;

pub use replay::{PortalDescription, PortalEntity, ReplaySession};

use crate::query::QueryRecord;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Timed out waiting for {0}")]
    Timeout(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Element not found: {0}")]
    ElementNotFound(String),
    #[error("No matching report for '{0}'")]
    NoMatchingReport(String),
    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),
    #[error("Invalid portal description {path}: {reason}")]
    Portal { path: PathBuf, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SessionError {
    /// Errors a download retry may clear.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SessionError::Timeout(_) | SessionError::Transport(_) | SessionError::HttpStatus(_)
        )
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Export options the retrieval flow asks the portal for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub report_code: String,
    pub format: String,
    pub file_name: String,
}

/// Remote portal interaction. One session is held exclusively for a whole
/// discovery or drain pass; every call may fail with a timeout or
/// transport error.
pub trait BrowserSession {
    /// Names of the selectable entities, stable within a run.
    fn list_entities(&mut self) -> SessionResult<Vec<String>>;

    /// Latest metadata the portal reports for `entity`. `Ok(None)` means the
    /// lookup itself failed (missing page element), not that the entity has
    /// no data.
    fn fetch_latest_query_info(&mut self, entity: &str) -> SessionResult<Option<QueryRecord>>;

    fn select_entity(&mut self, entity: &str) -> SessionResult<()>;

    fn configure_export(&mut self, record: &QueryRecord, request: &ExportRequest) -> SessionResult<()>;

    fn submit_export(&mut self) -> SessionResult<()>;

    fn poll_ready(&mut self) -> SessionResult<bool>;

    /// Fetches the generated artifact into `dest_dir` and returns its path.
    fn download_artifact(&mut self, dest_dir: &Path) -> SessionResult<PathBuf>;

    /// Removes exports left over on the portal side.
    fn delete_generated_artifact(&mut self) -> SessionResult<()>;
}
