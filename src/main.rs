// Thu Oct 15 2026 - Alex

use tariff_harvest::ui::{cli, ErrorDisplay};

fn main() {
    if let Err(e) = cli::run() {
        ErrorDisplay::new().print(&e);
        std::process::exit(1);
    }
}
