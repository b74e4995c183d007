// Thu Oct 15 2026 - Alex

pub mod banner;
pub mod cli;
pub mod errors;
pub mod progress;

pub use banner::Banner;
pub use cli::{Args, Command, CommandHandler};
pub use errors::ErrorDisplay;
pub use progress::{PassProgress, ProgressManager};

use crate::orchestration::{DiscoveryReport, DrainReport, RunReport};
use colored::Colorize;

pub struct UIManager {
    quiet: bool,
}

impl UIManager {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn print_banner(&self) {
        if !self.quiet {
            Banner::print();
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            print_info(message);
        }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            print_success(message);
        }
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            print_warning(message);
        }
    }

    pub fn error(&self, message: &str) {
        print_error(message);
    }

    pub fn print_summary(&self, title: &str, items: &[(&str, String)]) {
        if self.quiet {
            return;
        }
        println!();
        println!("{}", title.cyan().bold());
        println!("{}", "-".repeat(40).cyan());
        for (key, value) in items {
            println!("  {}: {}", key.bold(), value);
        }
    }

    pub fn print_discovery(&self, report: &DiscoveryReport) {
        self.print_summary(
            "Discovery",
            &[
                ("Checked", report.checked.to_string()),
                ("Newly queued", report.queued.to_string().green().to_string()),
                ("Already queued", report.already_queued.to_string()),
                ("Up to date", report.already_fresh.to_string()),
                ("Failed", colour_count(report.failed, false)),
            ],
        );
    }

    pub fn print_drain(&self, title: &str, report: &DrainReport) {
        self.print_summary(
            title,
            &[
                ("Completed", report.completed.to_string().green().to_string()),
                ("Left pending", colour_count(report.left_pending, true)),
                ("Dropped", colour_count(report.dropped, false)),
            ],
        );

        if self.quiet {
            return;
        }
        for failure in &report.failures {
            println!(
                "  {} {} ({}): {}",
                "✗".red(),
                failure.record,
                failure.severity,
                failure.reason
            );
        }
    }

    pub fn print_run(&self, report: &RunReport) {
        if let Some(resumed) = &report.resumed {
            self.print_drain("Resumed backlog", resumed);
        }
        if let Some(discovery) = &report.discovery {
            self.print_discovery(discovery);
        }
        self.print_drain("Drain", &report.drain);
    }
}

impl Default for UIManager {
    fn default() -> Self {
        Self::new()
    }
}

fn colour_count(count: usize, warn_only: bool) -> String {
    match (count, warn_only) {
        (0, _) => count.to_string(),
        (_, true) => count.to_string().yellow().to_string(),
        (_, false) => count.to_string().red().to_string(),
    }
}

pub fn print_info(message: &str) {
    println!("{} {}", "[INFO]".cyan(), message);
}

pub fn print_success(message: &str) {
    println!("{} {}", "[OK]".green(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "[WARN]".yellow(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red(), message);
}
