// Thu Oct 15 2026 - Alex

use crate::config::Config;
use crate::query::{PeriodComparison, QueryRecord};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "tariff-harvest")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Incremental tariff report harvester", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// JSON settings file; unset fields keep their defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Root for logs, queue and downloaded reports
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true)]
    pub no_color: bool,

    /// Compare period keys as plain strings
    #[arg(long, global = true)]
    pub ordinal_periods: bool,
}

impl Args {
    /// Layers the command-line overrides on top of the loaded settings.
    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(data_dir) = &self.data_dir {
            config = config.with_data_dir(data_dir.clone());
        }
        if self.ordinal_periods {
            config = config.with_period_comparison(PeriodComparison::Ordinal);
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Discover stale entities and retrieve everything queued
    Run(RunArgs),
    /// Only queue entities whose portal data is newer than the last completion
    Discover(DiscoverArgs),
    /// Only retrieve what is already queued
    Drain(ReplayArgs),
    /// Show completions, discovery failures and the pending queue
    Status(StatusArgs),
    /// Inspect or edit the pending queue
    Queue(QueueArgs),
    /// Extract every downloaded archive not extracted yet
    Extract(DirArgs),
    /// Stack extracted reports into one table per report kind
    Stack(DirArgs),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Portal description to replay
    #[arg(short, long)]
    pub replay: PathBuf,

    #[arg(long)]
    pub resume_first: bool,

    #[arg(long)]
    pub skip_discovery: bool,
}

#[derive(Parser, Debug)]
pub struct ReplayArgs {
    #[arg(short, long)]
    pub replay: PathBuf,
}

#[derive(Parser, Debug)]
pub struct DiscoverArgs {
    #[arg(short, long)]
    pub replay: PathBuf,

    /// Limit discovery to these entities instead of every listed one
    #[arg(short, long = "entity")]
    pub entities: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Print every error log row instead of distinct entities
    #[arg(long)]
    pub all_errors: bool,
}

#[derive(Parser, Debug)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub action: QueueAction,
}

#[derive(Subcommand, Debug)]
pub enum QueueAction {
    List,
    Add(RecordArgs),
    Remove(RecordArgs),
}

#[derive(Parser, Debug)]
pub struct RecordArgs {
    pub entity: String,

    #[arg(short, long)]
    pub period: String,

    #[arg(long, default_value = "")]
    pub volume: String,

    #[arg(long, default_value = "")]
    pub scheme: String,
}

#[derive(Parser, Debug)]
pub struct DirArgs {
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    #[arg(long)]
    pub dest: Option<PathBuf>,
}

impl RecordArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.entity.trim().is_empty() {
            return Err("Entity must not be empty".to_string());
        }
        if self.period.trim().is_empty() {
            return Err("Period must not be empty".to_string());
        }
        Ok(())
    }

    pub fn to_record(&self) -> QueryRecord {
        QueryRecord::new(
            self.entity.trim(),
            self.period.trim(),
            self.volume.trim(),
            self.scheme.trim(),
        )
    }
}

impl ReplayArgs {
    pub fn validate(&self) -> Result<(), String> {
        validate_replay(&self.replay)
    }
}

impl RunArgs {
    pub fn validate(&self) -> Result<(), String> {
        validate_replay(&self.replay)
    }
}

impl DiscoverArgs {
    pub fn validate(&self) -> Result<(), String> {
        validate_replay(&self.replay)
    }
}

fn validate_replay(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("Replay file does not exist: {:?}", path));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let args = Args::parse_from([
            "tariff-harvest",
            "--data-dir",
            "/srv/tariffs",
            "run",
            "--replay",
            "portal.json",
            "--resume-first",
        ]);

        assert_eq!(args.data_dir, Some(PathBuf::from("/srv/tariffs")));
        match args.command {
            Command::Run(run) => {
                assert!(run.resume_first);
                assert!(!run.skip_discovery);
                assert_eq!(run.replay, PathBuf::from("portal.json"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_overrides_applied_to_config() {
        let args = Args::parse_from([
            "tariff-harvest", "--ordinal-periods", "-d", "/srv/tariffs", "status",
        ]);

        let config = args.apply_overrides(Config::new());
        assert_eq!(config.period_comparison, PeriodComparison::Ordinal);
        assert_eq!(config.data_dir, PathBuf::from("/srv/tariffs"));

        let plain = Args::parse_from(["tariff-harvest", "status"]).apply_overrides(Config::new());
        assert_eq!(plain.period_comparison, PeriodComparison::Numeric);
        assert_eq!(plain.data_dir, PathBuf::from("."));
    }

    #[test]
    fn test_parse_queue_add() {
        let args = Args::parse_from([
            "tariff-harvest", "queue", "add", "Brazil", "--period", "2021", "--scheme", "HS",
        ]);

        match args.command {
            Command::Queue(QueueArgs { action: QueueAction::Add(record) }) => {
                assert!(record.validate().is_ok());
                assert_eq!(record.to_record(), QueryRecord::new("Brazil", "2021", "", "HS"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_discover_entities() {
        let args = Args::parse_from([
            "tariff-harvest", "-q", "discover", "-r", "p.json", "-e", "Brazil", "-e", "Chile",
        ]);

        assert!(args.quiet);
        match args.command {
            Command::Discover(discover) => assert_eq!(discover.entities, vec!["Brazil", "Chile"]),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
