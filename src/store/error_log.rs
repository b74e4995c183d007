// Wed Oct 14 2026 - Alex

use super::delimited::{append_row, read_table};
use super::error::{StoreError, StoreResult};
use super::freshness::DATE_FORMAT;
use crate::config::Config;
use crate::query::ParseError;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const ERROR_COLUMNS: [&str; 2] = ["COUNTRY", "ERROR_DATE"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub entity_id: String,
    pub error_date: NaiveDate,
}

/// Append-only record of entities whose metadata lookup failed. Repeated
/// failures add repeated rows.
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(config: &Config) -> Self {
        Self::at(config.error_log_path())
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, entity_id: &str, error_date: NaiveDate) -> StoreResult<()> {
        let row = vec![
            entity_id.to_string(),
            error_date.format(DATE_FORMAT).to_string(),
        ];
        append_row(&self.path, &ERROR_COLUMNS, &row)?;
        log::info!("Recorded discovery failure for '{}'", entity_id);
        Ok(())
    }

    pub fn entries(&self) -> StoreResult<Vec<ErrorEntry>> {
        let mut out = Vec::new();

        for row in read_table(&self.path, &ERROR_COLUMNS)? {
            let entity_id = row.fields[0].as_str();
            if entity_id.trim().is_empty() {
                return Err(StoreError::corrupt_log(
                    &self.path,
                    row.line,
                    ParseError::EmptyField(ERROR_COLUMNS[0]),
                ));
            }

            let date = row.fields[1].trim();
            let error_date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
                StoreError::corrupt_log(
                    &self.path,
                    row.line,
                    ParseError::BadDate {
                        field: ERROR_COLUMNS[1],
                        value: date.to_string(),
                    },
                )
            })?;

            out.push(ErrorEntry {
                entity_id: entity_id.to_string(),
                error_date,
            });
        }

        Ok(out)
    }

    pub fn distinct_entities(&self) -> StoreResult<BTreeSet<String>> {
        Ok(self.entries()?.into_iter().map(|e| e.entity_id).collect())
    }
}
