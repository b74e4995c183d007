// Wed Oct 14 2026 - Alex

pub mod fs;
pub mod logging;
pub mod names;
pub mod pacing;

pub use logging::LoggingUtils;
pub use names::{normalize_column_name, normalize_name};
pub use pacing::Pacer;

pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
