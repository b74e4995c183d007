// Thu Oct 15 2026 - Alex

use super::integrity::IntegrityIssue;
use super::machine::StateKind;
use crate::archive::ArchiveError;
use crate::session::SessionError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Retrying cannot help; the query leaves the queue.
    Terminal,
    /// The query stays queued for a later pass.
    Recoverable,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Terminal => write!(f, "terminal"),
            Severity::Recoverable => write!(f, "recoverable"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RetrievalFailure {
    #[error("Entity '{0}' is no longer selectable")]
    EntityNotFound(String),
    #[error("No '{report_code}' report available for '{entity}'")]
    UnsupportedReportType { entity: String, report_code: String },
    #[error("Export not ready after {attempts} polls")]
    ExportTimeout { attempts: u32 },
    #[error("Download failed after {attempts} attempt(s): {reason}")]
    DownloadFailure { attempts: u32, reason: String },
    #[error("Integrity check failed: {0}")]
    IntegrityMismatch(#[from] IntegrityIssue),
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ArchiveError),
    #[error("Session error during {state}: {source}")]
    Session {
        state: StateKind,
        #[source]
        source: SessionError,
    },
}

impl RetrievalFailure {
    pub fn severity(&self) -> Severity {
        match self {
            RetrievalFailure::EntityNotFound(_) | RetrievalFailure::UnsupportedReportType { .. } => {
                Severity::Terminal
            }
            _ => Severity::Recoverable,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.severity() == Severity::Terminal
    }
}
