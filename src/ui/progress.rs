// Thu Oct 15 2026 - Alex

use crate::orchestration::{Pass, PassObserver};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::cell::RefCell;
use std::time::Duration;

const BAR_TEMPLATE: &str = "{spinner:.cyan} [{elapsed_precise}] {prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

pub struct ProgressManager {
    multi: MultiProgress,
    enabled: bool,
    style_template: String,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            enabled: true,
            style_template: BAR_TEMPLATE.to_string(),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        if !enabled {
            self.multi.set_draw_target(ProgressDrawTarget::hidden());
        }
        self
    }

    pub fn create_main_progress(&self, total: u64, prefix: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::default_bar()
            .template(&self.style_template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ ");

        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(style);
        pb.set_prefix(prefix.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Shows each discovery or drain pass as its own bar.
pub struct PassProgress {
    manager: ProgressManager,
    current: RefCell<Option<ProgressBar>>,
}

impl PassProgress {
    pub fn new(manager: ProgressManager) -> Self {
        Self {
            manager,
            current: RefCell::new(None),
        }
    }
}

impl PassObserver for PassProgress {
    fn begin(&self, pass: Pass, total: usize) {
        let bar = self.manager.create_main_progress(total as u64, &pass.to_string());
        *self.current.borrow_mut() = Some(bar);
    }

    fn advance(&self, item: &str) {
        if let Some(bar) = self.current.borrow().as_ref() {
            bar.set_message(item.to_string());
            bar.inc(1);
        }
    }

    fn finish(&self, summary: &str) {
        if let Some(bar) = self.current.borrow_mut().take() {
            bar.finish_with_message(summary.to_string());
        }
    }
}
