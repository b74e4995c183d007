// Wed Oct 14 2026 - Alex

use crate::query::PeriodComparison;
use crate::utils::names::DEFAULT_MAX_NAME_CHARS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Run settings, built once and handed by reference to every component.
/// Store paths left unset resolve under `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub freshness_log_path: Option<PathBuf>,
    pub error_log_path: Option<PathBuf>,
    pub queue_path: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
    pub extract_dir: Option<PathBuf>,
    pub stacked_dir: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub download_attempts: u32,
    pub step_pause_min_ms: u64,
    pub step_pause_max_ms: u64,
    pub period_comparison: PeriodComparison,
    pub report_code: String,
    pub export_format: String,
    pub max_name_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            freshness_log_path: None,
            error_log_path: None,
            queue_path: None,
            download_dir: None,
            extract_dir: None,
            stacked_dir: None,
            poll_interval_ms: 5000,
            max_poll_attempts: 60,
            download_attempts: 3,
            step_pause_min_ms: 750,
            step_pause_max_ms: 1250,
            period_comparison: PeriodComparison::Numeric,
            report_code: "TL".to_string(),
            export_format: "txt".to_string(),
            max_name_chars: DEFAULT_MAX_NAME_CHARS,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }

    pub fn with_period_comparison(mut self, comparison: PeriodComparison) -> Self {
        self.period_comparison = comparison;
        self
    }

    /// Zero delays everywhere; used for offline replays and tests.
    pub fn without_delays(mut self) -> Self {
        self.poll_interval_ms = 0;
        self.step_pause_min_ms = 0;
        self.step_pause_max_ms = 0;
        self
    }

    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    pub fn with_download_attempts(mut self, attempts: u32) -> Self {
        self.download_attempts = attempts;
        self
    }

    pub fn freshness_log_path(&self) -> PathBuf {
        self.resolve(&self.freshness_log_path, "log/completed_queries.csv")
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.resolve(&self.error_log_path, "log/query_errors.csv")
    }

    pub fn queue_path(&self) -> PathBuf {
        self.resolve(&self.queue_path, "temp/pending_queries.json")
    }

    pub fn download_dir(&self) -> PathBuf {
        self.resolve(&self.download_dir, "data/bronze/tl/zip")
    }

    pub fn extract_dir(&self) -> PathBuf {
        self.resolve(&self.extract_dir, "data/bronze/tl")
    }

    pub fn stacked_dir(&self) -> PathBuf {
        self.resolve(&self.stacked_dir, "data/bronze/tl/stacked")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn resolve(&self, explicit: &Option<PathBuf>, default_relative: &str) -> PathBuf {
        match explicit {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.data_dir.join(path),
            None => self.data_dir.join(default_relative),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_poll_attempts == 0 {
            return Err("max_poll_attempts must be greater than 0".to_string());
        }
        if self.download_attempts == 0 {
            return Err("download_attempts must be greater than 0".to_string());
        }
        if self.step_pause_min_ms > self.step_pause_max_ms {
            return Err("step_pause_min_ms must not exceed step_pause_max_ms".to_string());
        }
        if self.report_code.trim().is_empty() {
            return Err("report_code must not be empty".to_string());
        }
        if self.max_name_chars == 0 {
            return Err("max_name_chars must be greater than 0".to_string());
        }
        Ok(())
    }
}
