// Thu Oct 15 2026 - Alex

use colored::*;

pub struct Banner {
    title: String,
    subtitle: Option<String>,
    version: Option<String>,
    width: usize,
}

impl Banner {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: None,
            version: None,
            width: 50,
        }
    }

    pub fn with_subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(self.width);
        let mut title = self.title.clone();
        if let Some(version) = &self.version {
            title.push_str(&format!(" v{}", version));
        }

        let mut out = format!("{}\n{}\n", rule.cyan(), title.cyan().bold());
        if let Some(subtitle) = &self.subtitle {
            out.push_str(&format!("{}\n", subtitle.dimmed()));
        }
        out.push_str(&format!("{}\n", rule.cyan()));
        out
    }

    pub fn print() {
        let banner = Banner::new("tariff-harvest")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_subtitle("Incremental tariff report harvester");
        println!("{}", banner.render());
    }
}
