// Wed Oct 14 2026 - Alex

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Column names used wherever a query is written as a delimited row.
pub const QUERY_COLUMNS: [&str; 4] = ["COUNTRY", "YEAR", "IMPORTS", "NOMENCLATURE"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Field '{0}' is empty")]
    EmptyField(&'static str),
    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("Unexpected header: expected '{expected}', found '{found}'")]
    Header { expected: String, found: String },
    #[error("Invalid date '{value}' in field '{field}'")]
    BadDate { field: &'static str, value: String },
}

/// One retrieval target: the entity plus what the portal currently reports as
/// its latest data. Equality is structural over all four fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryRecord {
    entity_id: String,
    period_key: String,
    volume_measure: String,
    classification_scheme: String,
}

impl QueryRecord {
    pub fn new(
        entity_id: impl Into<String>,
        period_key: impl Into<String>,
        volume_measure: impl Into<String>,
        classification_scheme: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            period_key: period_key.into(),
            volume_measure: volume_measure.into(),
            classification_scheme: classification_scheme.into(),
        }
    }

    /// Typed parse of the four query columns, in `QUERY_COLUMNS` order.
    /// Only the entity is mandatory; the portal leaves the other cells blank
    /// when it has nothing to report. Values are kept verbatim so a stored
    /// record compares equal to the one it was written from.
    pub fn from_fields(fields: &[&str]) -> Result<Self, ParseError> {
        if fields.len() != QUERY_COLUMNS.len() {
            return Err(ParseError::FieldCount {
                expected: QUERY_COLUMNS.len(),
                found: fields.len(),
            });
        }

        if fields[0].trim().is_empty() {
            return Err(ParseError::EmptyField(QUERY_COLUMNS[0]));
        }

        Ok(Self::new(fields[0], fields[1], fields[2], fields[3]))
    }

    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.entity_id.clone(),
            self.period_key.clone(),
            self.volume_measure.clone(),
            self.classification_scheme.clone(),
        ]
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn period_key(&self) -> &str {
        &self.period_key
    }

    pub fn volume_measure(&self) -> &str {
        &self.volume_measure
    }

    pub fn classification_scheme(&self) -> &str {
        &self.classification_scheme
    }
}

impl fmt::Display for QueryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} / {} / {}]",
            self.entity_id, self.period_key, self.volume_measure, self.classification_scheme
        )
    }
}

/// How a stored period key is ordered against the one the portal reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PeriodComparison {
    /// Integer comparison when both keys are integers, ordinal otherwise.
    #[default]
    Numeric,
    /// Plain string ordering. "999" sorts after "1000".
    Ordinal,
}

impl PeriodComparison {
    pub fn compare(&self, stored: &str, incoming: &str) -> Ordering {
        let (stored, incoming) = (stored.trim(), incoming.trim());

        if *self == PeriodComparison::Numeric {
            if let (Ok(a), Ok(b)) = (stored.parse::<u64>(), incoming.parse::<u64>()) {
                return a.cmp(&b);
            }
        }

        stored.cmp(incoming)
    }
}
