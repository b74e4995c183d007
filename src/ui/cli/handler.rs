// Thu Oct 15 2026 - Alex

use super::args::{
    Args, Command, DirArgs, DiscoverArgs, QueueAction, QueueArgs, ReplayArgs, RunArgs, StatusArgs,
};
use crate::archive::{extract_all, ManifestGuard, ZipExtractor};
use crate::config::Config;
use crate::orchestration::{Orchestrator, RunOptions};
use crate::session::{BrowserSession, ReplaySession};
use crate::stack::{stack_reports, StackOutcome};
use crate::store::{ErrorLog, FreshnessLog, PendingQueue, DATE_FORMAT};
use crate::ui::progress::{PassProgress, ProgressManager};
use crate::ui::UIManager;
use crate::utils::{pluralize, LoggingUtils};
use anyhow::Context;

pub struct CommandHandler {
    ui: UIManager,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self {
            ui: UIManager::new(),
        }
    }

    pub fn execute(mut self, args: Args) -> anyhow::Result<()> {
        if args.no_color {
            colored::control::set_override(false);
        }

        self.ui = UIManager::new().with_quiet(args.quiet);
        self.setup_logging(&args);
        self.ui.print_banner();

        let config = self.load_config(&args)?;
        log::debug!("Data directory: {}", config.data_dir.display());

        match args.command {
            Command::Run(run_args) => self.handle_run(&config, run_args),
            Command::Discover(discover_args) => self.handle_discover(&config, discover_args),
            Command::Drain(drain_args) => self.handle_drain(&config, drain_args),
            Command::Status(status_args) => self.handle_status(&config, status_args),
            Command::Queue(queue_args) => self.handle_queue(&config, queue_args),
            Command::Extract(dir_args) => self.handle_extract(&config, dir_args),
            Command::Stack(dir_args) => self.handle_stack(&config, dir_args),
        }
    }

    fn setup_logging(&self, args: &Args) {
        let level = if args.quiet {
            log::LevelFilter::Warn
        } else {
            LoggingUtils::level_from_str(&args.log_level)
        };
        LoggingUtils::init_logger(level);
    }

    fn load_config(&self, args: &Args) -> anyhow::Result<Config> {
        let loaded = match &args.config {
            Some(path) => Config::load(path)?,
            None => Config::new(),
        };
        let config = args.apply_overrides(loaded);

        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    fn open_replay(&self, path: &std::path::Path) -> anyhow::Result<ReplaySession> {
        ReplaySession::from_file(path)
            .with_context(|| format!("Failed to open replay portal {}", path.display()))
    }

    fn orchestrator<'a>(&self, config: &'a Config, session: ReplaySession) -> Orchestrator<'a, ReplaySession> {
        let progress = ProgressManager::new().with_enabled(!self.ui.is_quiet());
        Orchestrator::new(config, session).with_observer(Box::new(PassProgress::new(progress)))
    }

    fn handle_run(&self, config: &Config, args: RunArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let session = self.open_replay(&args.replay)?;
        let mut orchestrator = self.orchestrator(config, session);
        let report = orchestrator
            .run(RunOptions {
                resume_first: args.resume_first,
                skip_discovery: args.skip_discovery,
            })
            .context("Run aborted")?;

        self.ui.print_run(&report);
        self.ui.success(&format!(
            "Run finished, {} retrieved",
            pluralize(report.total_completed(), "query", "queries")
        ));
        Ok(())
    }

    fn handle_discover(&self, config: &Config, args: DiscoverArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let mut session = self.open_replay(&args.replay)?;
        let entities = if args.entities.is_empty() {
            session.list_entities().context("Could not list entities")?
        } else {
            args.entities.clone()
        };

        let mut orchestrator = self.orchestrator(config, session);
        let report = orchestrator.discover(&entities).context("Discovery aborted")?;

        self.ui.print_discovery(&report);
        Ok(())
    }

    fn handle_drain(&self, config: &Config, args: ReplayArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;

        let session = self.open_replay(&args.replay)?;
        let mut orchestrator = self.orchestrator(config, session);
        let report = orchestrator.drain().context("Drain aborted")?;

        self.ui.print_drain("Drain", &report);
        Ok(())
    }

    fn handle_status(&self, config: &Config, args: StatusArgs) -> anyhow::Result<()> {
        let completed = FreshnessLog::new(config).entries()?;
        let error_log = ErrorLog::new(config);
        let errors = error_log.entries()?;
        let pending = PendingQueue::new(config).load()?;

        self.ui.print_summary(
            "Status",
            &[
                ("Completed entities", completed.len().to_string()),
                ("Pending queries", pending.len().to_string()),
                ("Discovery failures", errors.len().to_string()),
            ],
        );

        for entry in &completed {
            self.ui.info(&format!(
                "{} completed on {}",
                entry.record,
                entry.completed_on.format(DATE_FORMAT)
            ));
        }

        for record in &pending {
            self.ui.warning(&format!("pending: {}", record));
        }

        if args.all_errors {
            for entry in &errors {
                self.ui.error(&format!(
                    "{} failed discovery on {}",
                    entry.entity_id,
                    entry.error_date.format(DATE_FORMAT)
                ));
            }
        } else {
            for entity in error_log.distinct_entities()? {
                let count = errors.iter().filter(|e| e.entity_id == entity).count();
                self.ui.error(&format!(
                    "{} failed discovery {}",
                    entity,
                    pluralize(count, "time", "times")
                ));
            }
        }

        Ok(())
    }

    fn handle_queue(&self, config: &Config, args: QueueArgs) -> anyhow::Result<()> {
        let queue = PendingQueue::new(config);

        match args.action {
            QueueAction::List => {
                let pending = queue.load()?;
                if pending.is_empty() {
                    self.ui.info("Queue is empty");
                }
                for (i, record) in pending.iter().enumerate() {
                    println!("{:>4}. {}", i + 1, record);
                }
            }
            QueueAction::Add(record_args) => {
                record_args.validate().map_err(|e| anyhow::anyhow!(e))?;
                let record = record_args.to_record();
                if queue.enqueue(&record)? {
                    self.ui.success(&format!("Queued {}", record));
                } else {
                    self.ui.warning(&format!("{} is already queued", record));
                }
            }
            QueueAction::Remove(record_args) => {
                record_args.validate().map_err(|e| anyhow::anyhow!(e))?;
                let record = record_args.to_record();
                queue.dequeue(&record)?;
                self.ui.success(&format!("Removed {}", record));
            }
        }

        Ok(())
    }

    fn handle_extract(&self, config: &Config, args: DirArgs) -> anyhow::Result<()> {
        let source = args.source.unwrap_or_else(|| config.download_dir());
        let dest = args.dest.unwrap_or_else(|| config.extract_dir());

        let extractor = ManifestGuard::new(ZipExtractor::new());
        let summary = extract_all(&extractor, &source, &dest)
            .with_context(|| format!("Failed to extract archives from {}", source.display()))?;

        self.ui.success(&format!(
            "{} extracted, {} already up to date",
            pluralize(summary.extracted, "archive", "archives"),
            summary.skipped
        ));
        Ok(())
    }

    fn handle_stack(&self, config: &Config, args: DirArgs) -> anyhow::Result<()> {
        let source = args.source.unwrap_or_else(|| config.extract_dir());
        let dest = args.dest.unwrap_or_else(|| config.stacked_dir());

        let results = stack_reports(&source, &dest)
            .with_context(|| format!("Failed to stack reports from {}", source.display()))?;

        for (kind, outcome) in results {
            match outcome {
                StackOutcome::Written { files, rows } => self.ui.success(&format!(
                    "'{}': stacked {} into {} ({} rows)",
                    kind.name,
                    pluralize(files, "file", "files"),
                    dest.join(kind.output_name()).display(),
                    rows
                )),
                StackOutcome::AlreadyStacked => {
                    self.ui.info(&format!("'{}' already stacked", kind.name))
                }
                StackOutcome::NoInput => self.ui.warning(&format!("'{}': no reports found", kind.name)),
            }
        }

        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
