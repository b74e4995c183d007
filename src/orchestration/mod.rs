// Thu Oct 15 2026 - Alex

pub mod coordinator;
pub mod observer;
pub mod report;

pub use coordinator::{Orchestrator, RunError, RunOptions};
pub use observer::{NullObserver, Pass, PassObserver};
pub use report::{DiscoveryReport, DrainFailure, DrainReport, RunReport};
