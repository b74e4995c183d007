// Thu Oct 15 2026 - Alex

use crate::utils::fs::write_atomic;
use crate::utils::normalize_column_name;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StackError + '_ {
    move |source| StackError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// One of the report families shipped inside a tariff export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportKind {
    pub name: &'static str,
    marker: &'static str,
}

pub const REPORT_KINDS: [ReportKind; 4] = [
    ReportKind { name: "Duty Details", marker: "DutyDetails" },
    ReportKind { name: "PTA Trade Details", marker: "PTATradeDetails" },
    ReportKind { name: "Tariff Details", marker: "TariffDetails" },
    ReportKind { name: "Trade Details", marker: "TradeDetails" },
];

impl ReportKind {
    pub fn output_name(&self) -> String {
        format!("{}.csv", self.name.to_lowercase().replace(' ', "_"))
    }

    /// `<entity>_<Marker>_<code>.txt`; the leading `_` keeps `TradeDetails`
    /// from also matching `PTATradeDetails`.
    pub fn matches(&self, file_name: &str) -> bool {
        file_name.ends_with(".txt") && file_name.contains(&format!("_{}", self.marker))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOutcome {
    Written { files: usize, rows: usize },
    AlreadyStacked,
    NoInput,
}

/// `X, Y, X` becomes `X_1, Y, X_2`.
pub fn rename_duplicates(columns: &[String]) -> Vec<String> {
    let mut totals: HashMap<&str, usize> = HashMap::new();
    for column in columns {
        *totals.entry(column.as_str()).or_default() += 1;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    columns
        .iter()
        .map(|column| {
            if totals[column.as_str()] > 1 {
                let n = seen.entry(column.as_str()).or_default();
                *n += 1;
                format!("{}_{}", column, n)
            } else {
                column.clone()
            }
        })
        .collect()
}

fn matching_files(source_dir: &Path, kind: &ReportKind) -> Result<Vec<PathBuf>, StackError> {
    let mut files: Vec<PathBuf> = fs::read_dir(source_dir)
        .map_err(io_err(source_dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| kind.matches(n))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Concatenates every report of `kind` into one tab separated table. The
/// header comes from the first file, normalized; later headers are dropped.
pub fn stack_kind(kind: &ReportKind, source_dir: &Path, dest_dir: &Path) -> Result<StackOutcome, StackError> {
    let target = dest_dir.join(kind.output_name());
    if target.exists() {
        log::info!("'{}' already stacked at {}", kind.name, target.display());
        return Ok(StackOutcome::AlreadyStacked);
    }

    let files = matching_files(source_dir, kind)?;
    let mut output = String::new();
    let mut header_written = false;
    let mut rows = 0;

    for file in &files {
        let text = fs::read_to_string(file).map_err(io_err(file))?;
        let mut lines = text.lines();

        let header = match lines.next() {
            Some(header) => header,
            None => continue,
        };

        if !header_written {
            let columns: Vec<String> = header
                .trim_start_matches('\u{feff}')
                .split('\t')
                .map(normalize_column_name)
                .collect();
            output.push_str(&rename_duplicates(&columns).join("\t"));
            output.push('\n');
            header_written = true;
        }

        for line in lines.filter(|l| !l.trim().is_empty()) {
            output.push_str(line);
            output.push('\n');
            rows += 1;
        }
    }

    if !header_written {
        log::warn!("No '{}' reports found in {}", kind.name, source_dir.display());
        return Ok(StackOutcome::NoInput);
    }

    write_atomic(&target, output.as_bytes()).map_err(io_err(&target))?;
    log::info!(
        "Stacked {} '{}' report(s), {} rows, into {}",
        files.len(),
        kind.name,
        rows,
        target.display()
    );

    Ok(StackOutcome::Written {
        files: files.len(),
        rows,
    })
}

pub fn stack_reports(source_dir: &Path, dest_dir: &Path) -> Result<Vec<(ReportKind, StackOutcome)>, StackError> {
    REPORT_KINDS
        .iter()
        .map(|kind| Ok((*kind, stack_kind(kind, source_dir, dest_dir)?)))
        .collect()
}
