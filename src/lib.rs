// Thu Oct 15 2026 - Alex

pub mod archive;
pub mod config;
pub mod orchestration;
pub mod query;
pub mod retrieval;
pub mod session;
pub mod stack;
pub mod store;
pub mod ui;
pub mod utils;

pub use config::Config;
pub use orchestration::{Orchestrator, RunOptions, RunReport};
pub use query::{PeriodComparison, QueryRecord};
pub use retrieval::{RetrievalFailure, RetrievalMachine};
pub use session::{BrowserSession, ReplaySession};
pub use store::{ErrorLog, FreshnessLog, PendingQueue, StoreError};
