// Thu Oct 15 2026 - Alex

use crate::query::QueryRecord;
use crate::utils::normalize_name;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const REPORTER_COLUMN: &str = "Reporter";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    #[error("cannot read entity from artifact name {0}")]
    UnnamedArtifact(PathBuf),
    #[error("report {0} not found in archive")]
    MissingReport(PathBuf),
    #[error("report {0} has no 'Reporter' value")]
    MissingReporter(PathBuf),
    #[error("expected '{expected}', artifact name says '{from_name}', content says '{from_content}'")]
    NameMismatch {
        expected: String,
        from_name: String,
        from_content: String,
    },
}

/// Entity as embedded in an export file name: everything before the last
/// `_<report_code>`.
pub fn entity_from_artifact_name(artifact: &Path, report_code: &str) -> Option<String> {
    let name = artifact.file_name()?.to_str()?;
    let marker = format!("_{}", report_code);
    let end = name.rfind(&marker)?;
    if end == 0 {
        return None;
    }
    Some(name[..end].to_string())
}

pub fn report_path(extract_dir: &Path, normalized_entity: &str, report_code: &str) -> PathBuf {
    extract_dir.join(format!("{}_DutyDetails_{}.txt", normalized_entity, report_code))
}

/// `Reporter` value of the first data row of a tab separated report.
pub fn reporter_from_report(report: &Path) -> Result<String, IntegrityIssue> {
    let text = fs::read_to_string(report).map_err(|_| IntegrityIssue::MissingReport(report.to_path_buf()))?;
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let missing = || IntegrityIssue::MissingReporter(report.to_path_buf());

    let header = lines.next().ok_or_else(missing)?;
    let column = header
        .split('\t')
        .position(|h| h.trim().trim_start_matches('\u{feff}') == REPORTER_COLUMN)
        .ok_or_else(missing)?;

    let row = lines.next().ok_or_else(missing)?;
    let value = row.split('\t').nth(column).map(str::trim).unwrap_or("");
    if value.is_empty() {
        return Err(missing());
    }

    Ok(value.to_string())
}

/// Checks that a downloaded export really belongs to the requested entity.
/// The portal occasionally serves another entity's export when requests
/// overlap.
#[derive(Debug, Clone)]
pub struct IntegrityCheck {
    report_code: String,
    max_name_chars: usize,
}

impl IntegrityCheck {
    pub fn new(report_code: &str, max_name_chars: usize) -> Self {
        Self {
            report_code: report_code.to_string(),
            max_name_chars,
        }
    }

    pub fn verify(&self, record: &QueryRecord, artifact: &Path, extract_dir: &Path) -> Result<(), IntegrityIssue> {
        let expected = normalize_name(record.entity_id(), self.max_name_chars);

        let raw_name = entity_from_artifact_name(artifact, &self.report_code)
            .ok_or_else(|| IntegrityIssue::UnnamedArtifact(artifact.to_path_buf()))?;
        let from_name = normalize_name(&raw_name, self.max_name_chars);

        let report = report_path(extract_dir, &expected, &self.report_code);
        let from_content = normalize_name(&reporter_from_report(&report)?, self.max_name_chars);

        if from_name != from_content || from_name != expected {
            return Err(IntegrityIssue::NameMismatch {
                expected,
                from_name,
                from_content,
            });
        }

        log::debug!("Integrity verified for {} ({})", record.entity_id(), artifact.display());
        Ok(())
    }
}
