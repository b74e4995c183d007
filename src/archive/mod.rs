// Thu Oct 15 2026 - Alex

pub mod manifest;
pub mod zipfile;

#[cfg(test)]
pub(crate) mod fixtures;

pub use manifest::{extract_all, ExtractionSummary, ManifestGuard, MANIFEST_FILE};
pub use zipfile::ZipExtractor;

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Bad archive {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: ::zip::result::ZipError,
    },
    #[error("Bad extraction manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },
}

impl ArchiveError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    Extracted { entries: usize },
    Skipped,
}

pub trait ArchiveExtractor {
    /// Unpacks `archive` into `dest`. Implementations must be idempotent.
    fn extract(&self, archive: &Path, dest: &Path) -> ArchiveResult<Extraction>;
}

impl<T: ArchiveExtractor + ?Sized> ArchiveExtractor for Box<T> {
    fn extract(&self, archive: &Path, dest: &Path) -> ArchiveResult<Extraction> {
        (**self).extract(archive, dest)
    }
}
