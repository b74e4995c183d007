// Thu Oct 15 2026 - Alex

use colored::Colorize;

/// Renders an error and its cause chain for the terminal.
pub struct ErrorDisplay {
    show_cause_chain: bool,
    max_depth: usize,
}

impl ErrorDisplay {
    pub fn new() -> Self {
        Self {
            show_cause_chain: true,
            max_depth: 10,
        }
    }

    pub fn without_cause_chain(mut self) -> Self {
        self.show_cause_chain = false;
        self
    }

    pub fn format(&self, error: &anyhow::Error) -> String {
        let mut output = format!("{} {}\n", "Error:".red().bold(), error);
        if !self.show_cause_chain {
            return output;
        }

        for (depth, cause) in error.chain().skip(1).enumerate() {
            if depth >= self.max_depth {
                output.push_str("  ... (cause chain truncated)\n");
                break;
            }
            output.push_str(&format!("  {} Caused by: {}\n", "→".yellow(), cause));
        }

        output
    }

    pub fn print(&self, error: &anyhow::Error) {
        eprint!("{}", self.format(error));
    }
}

impl Default for ErrorDisplay {
    fn default() -> Self {
        Self::new()
    }
}
