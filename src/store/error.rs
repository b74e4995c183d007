// Wed Oct 14 2026 - Alex

use crate::query::{ParseError, QueryRecord};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Corrupt log {path} at line {line}: {source}")]
    CorruptLog {
        path: PathBuf,
        line: usize,
        #[source]
        source: ParseError,
    },
    #[error("Corrupt queue snapshot {path}: {reason}")]
    CorruptQueue { path: PathBuf, reason: String },
    #[error("Query is not queued: {0}")]
    NotQueued(QueryRecord),
}

impl StoreError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn corrupt_log(path: &Path, line: usize, source: ParseError) -> Self {
        StoreError::CorruptLog {
            path: path.to_path_buf(),
            line,
            source,
        }
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, StoreError::CorruptLog { .. } | StoreError::CorruptQueue { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
