// Thu Oct 15 2026 - Alex

use super::{ArchiveError, ArchiveExtractor, ArchiveResult, Extraction};
use std::fs::{self, File};
use std::path::Path;
use zip::ZipArchive;

/// Plain zip extraction. Overwrites files already present in `dest`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl ZipExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveExtractor for ZipExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> ArchiveResult<Extraction> {
        let file = File::open(archive).map_err(|e| ArchiveError::io(archive, e))?;
        let zip_err = |source| ArchiveError::Zip {
            path: archive.to_path_buf(),
            source,
        };

        let mut zip = ZipArchive::new(file).map_err(zip_err)?;
        fs::create_dir_all(dest).map_err(|e| ArchiveError::io(dest, e))?;

        let entries = zip.len();
        zip.extract(dest).map_err(zip_err)?;

        log::debug!(
            "Extracted {} entries from {} into {}",
            entries,
            archive.display(),
            dest.display()
        );
        Ok(Extraction::Extracted { entries })
    }
}
