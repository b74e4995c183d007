// Thu Oct 15 2026 - Alex

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Discovery,
    Drain,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::Discovery => write!(f, "Discovery"),
            Pass::Drain => write!(f, "Drain"),
        }
    }
}

/// Progress hooks for a discovery or drain pass. Keeps the library free of
/// terminal concerns.
pub trait PassObserver {
    fn begin(&self, pass: Pass, total: usize);
    fn advance(&self, item: &str);
    fn finish(&self, summary: &str);
}

pub struct NullObserver;

impl PassObserver for NullObserver {
    fn begin(&self, _pass: Pass, _total: usize) {}
    fn advance(&self, _item: &str) {}
    fn finish(&self, _summary: &str) {}
}
