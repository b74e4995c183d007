// Thu Oct 15 2026 - Alex

use super::{ArchiveError, ArchiveExtractor, ArchiveResult, Extraction};
use crate::utils::fs::{read_optional, write_atomic};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = ".extracted.json";

/// Archive file name → SHA-256 of the archive bytes, stored in the
/// destination directory.
#[derive(Debug, Default)]
struct Manifest {
    path: PathBuf,
    signatures: BTreeMap<String, String>,
}

impl Manifest {
    fn load(dest: &Path) -> ArchiveResult<Self> {
        let path = dest.join(MANIFEST_FILE);
        let signatures = match read_optional(&path).map_err(|e| ArchiveError::io(&path, e))? {
            Some(text) => serde_json::from_str(&text).map_err(|e| ArchiveError::Manifest {
                path: path.clone(),
                reason: e.to_string(),
            })?,
            None => BTreeMap::new(),
        };

        Ok(Self { path, signatures })
    }

    fn save(&self) -> ArchiveResult<()> {
        let json = serde_json::to_vec_pretty(&self.signatures).map_err(|e| ArchiveError::Manifest {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        write_atomic(&self.path, &json).map_err(|e| ArchiveError::io(&self.path, e))
    }
}

fn file_signature(path: &Path) -> ArchiveResult<String> {
    let bytes = fs::read(path).map_err(|e| ArchiveError::io(path, e))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Makes any extractor idempotent: an archive whose name and content hash
/// are already recorded in the destination manifest is skipped.
pub struct ManifestGuard<E> {
    inner: E,
}

impl<E: ArchiveExtractor> ManifestGuard<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    pub fn is_extracted(&self, archive: &Path, dest: &Path) -> ArchiveResult<bool> {
        let manifest = Manifest::load(dest)?;
        let signature = file_signature(archive)?;
        Ok(manifest.signatures.get(&archive_name(archive)) == Some(&signature))
    }
}

fn archive_name(archive: &Path) -> String {
    archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl<E: ArchiveExtractor> ArchiveExtractor for ManifestGuard<E> {
    fn extract(&self, archive: &Path, dest: &Path) -> ArchiveResult<Extraction> {
        let name = archive_name(archive);
        let signature = file_signature(archive)?;
        let mut manifest = Manifest::load(dest)?;

        if manifest.signatures.get(&name) == Some(&signature) {
            log::debug!("'{}' already extracted into {}", name, dest.display());
            return Ok(Extraction::Skipped);
        }

        let result = self.inner.extract(archive, dest)?;
        manifest.signatures.insert(name, signature);
        manifest.save()?;
        Ok(result)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub extracted: usize,
    pub skipped: usize,
}

/// Runs `extractor` over every `*.zip` in `source_dir`, in name order.
pub fn extract_all(
    extractor: &dyn ArchiveExtractor,
    source_dir: &Path,
    dest: &Path,
) -> ArchiveResult<ExtractionSummary> {
    let mut archives: Vec<PathBuf> = fs::read_dir(source_dir)
        .map_err(|e| ArchiveError::io(source_dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("zip"))
                    .unwrap_or(false)
        })
        .collect();
    archives.sort();

    let mut summary = ExtractionSummary::default();
    for archive in &archives {
        match extractor.extract(archive, dest)? {
            Extraction::Extracted { .. } => summary.extracted += 1,
            Extraction::Skipped => summary.skipped += 1,
        }
    }

    log::info!(
        "Extraction finished: {} extracted, {} skipped",
        summary.extracted,
        summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::fixtures::write_zip;
    use crate::archive::ZipExtractor;
    use std::cell::Cell;

    struct CountingExtractor {
        calls: Cell<usize>,
    }

    impl ArchiveExtractor for CountingExtractor {
        fn extract(&self, _archive: &Path, _dest: &Path) -> ArchiveResult<Extraction> {
            self.calls.set(self.calls.get() + 1);
            Ok(Extraction::Extracted { entries: 1 })
        }
    }

    #[test]
    fn test_second_extraction_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("chile_TL.zip");
        write_zip(&archive, &[("chile_DutyDetails_TL.txt", "Reporter\nChile\n")]);

        let guard = ManifestGuard::new(CountingExtractor { calls: Cell::new(0) });
        let dest = dir.path().join("out");

        assert_eq!(guard.extract(&archive, &dest).unwrap(), Extraction::Extracted { entries: 1 });
        assert_eq!(guard.extract(&archive, &dest).unwrap(), Extraction::Skipped);
        assert_eq!(guard.inner.calls.get(), 1);
        assert!(guard.is_extracted(&archive, &dest).unwrap());
    }

    #[test]
    fn test_changed_content_is_extracted_again() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("chile_TL.zip");
        let dest = dir.path().join("out");
        let guard = ManifestGuard::new(ZipExtractor::new());

        write_zip(&archive, &[("report.txt", "2020")]);
        guard.extract(&archive, &dest).unwrap();

        write_zip(&archive, &[("report.txt", "2021")]);
        assert!(!guard.is_extracted(&archive, &dest).unwrap());
        guard.extract(&archive, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("report.txt")).unwrap(), "2021");
    }

    #[test]
    fn test_extract_all() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("zip");
        fs::create_dir_all(&source).unwrap();
        write_zip(&source.join("brazil_TL.zip"), &[("brazil.txt", "BR")]);
        write_zip(&source.join("chile_TL.zip"), &[("chile.txt", "CL")]);
        fs::write(source.join("notes.md"), "ignored").unwrap();

        let dest = dir.path().join("out");
        let guard = ManifestGuard::new(ZipExtractor::new());

        let first = extract_all(&guard, &source, &dest).unwrap();
        assert_eq!(first, ExtractionSummary { extracted: 2, skipped: 0 });

        let second = extract_all(&guard, &source, &dest).unwrap();
        assert_eq!(second, ExtractionSummary { extracted: 0, skipped: 2 });
        assert!(dest.join(MANIFEST_FILE).exists());
    }

    #[test]
    fn test_corrupt_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("peru_TL.zip");
        write_zip(&archive, &[("peru.txt", "PE")]);
        fs::write(dir.path().join(MANIFEST_FILE), "{").unwrap();

        let guard = ManifestGuard::new(ZipExtractor::new());
        let err = guard.extract(&archive, dir.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::Manifest { .. }));
    }
}
