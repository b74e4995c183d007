// Wed Oct 14 2026 - Alex

use super::delimited::{read_table, write_table, DelimitedRow};
use super::error::{StoreError, StoreResult};
use crate::config::Config;
use crate::query::{ParseError, PeriodComparison, QueryRecord, QUERY_COLUMNS};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const FRESHNESS_COLUMNS: [&str; 5] = [
    QUERY_COLUMNS[0],
    QUERY_COLUMNS[1],
    QUERY_COLUMNS[2],
    QUERY_COLUMNS[3],
    "COMPLETED_ON",
];

/// Last successfully completed query for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessEntry {
    pub record: QueryRecord,
    pub completed_on: NaiveDate,
}

impl FreshnessEntry {
    fn parse(row: &DelimitedRow) -> Result<Self, ParseError> {
        let fields = row.as_strs();
        let record = QueryRecord::from_fields(&fields[..QUERY_COLUMNS.len()])?;

        let date = fields[QUERY_COLUMNS.len()].trim();
        let completed_on = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
            ParseError::BadDate {
                field: FRESHNESS_COLUMNS[4],
                value: date.to_string(),
            }
        })?;

        Ok(Self { record, completed_on })
    }

    fn to_row(&self) -> Vec<String> {
        let mut row = self.record.to_fields();
        row.push(self.completed_on.format(DATE_FORMAT).to_string());
        row
    }
}

/// Durable entity → last completed query mapping. The file is the source of
/// truth; every call reloads it.
pub struct FreshnessLog {
    path: PathBuf,
    comparison: PeriodComparison,
}

impl FreshnessLog {
    pub fn new(config: &Config) -> Self {
        Self::at(config.freshness_log_path(), config.period_comparison)
    }

    pub fn at(path: PathBuf, comparison: PeriodComparison) -> Self {
        Self { path, comparison }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> StoreResult<Vec<FreshnessEntry>> {
        read_table(&self.path, &FRESHNESS_COLUMNS)?
            .iter()
            .map(|row| {
                FreshnessEntry::parse(row)
                    .map_err(|e| StoreError::corrupt_log(&self.path, row.line, e))
            })
            .collect()
    }

    pub fn entry_for(&self, entity_id: &str) -> StoreResult<Option<FreshnessEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .find(|e| e.record.entity_id() == entity_id))
    }

    /// False when the entity was never completed or the stored period sorts
    /// before the one the portal now reports.
    pub fn is_fresh(&self, query: &QueryRecord) -> StoreResult<bool> {
        let entry = match self.entry_for(query.entity_id())? {
            Some(entry) => entry,
            None => return Ok(false),
        };

        let ordering = self
            .comparison
            .compare(entry.record.period_key(), query.period_key());

        Ok(ordering != Ordering::Less)
    }

    /// Replaces the entity's row, keeps rows sorted by entity and rewrites
    /// the file.
    pub fn record_success(&self, query: &QueryRecord, completed_on: NaiveDate) -> StoreResult<()> {
        let mut entries = self.entries()?;
        entries.retain(|e| e.record.entity_id() != query.entity_id());
        entries.push(FreshnessEntry {
            record: query.clone(),
            completed_on,
        });
        entries.sort_by(|a, b| a.record.entity_id().cmp(b.record.entity_id()));

        let rows: Vec<Vec<String>> = entries.iter().map(|e| e.to_row()).collect();
        write_table(&self.path, &FRESHNESS_COLUMNS, &rows)?;

        log::info!("Recorded completion for '{}' ({})", query.entity_id(), query.period_key());
        Ok(())
    }
}
