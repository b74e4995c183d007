// Wed Oct 14 2026 - Alex

pub mod delimited;
pub mod error;
pub mod error_log;
pub mod freshness;
pub mod queue;

pub use error::{StoreError, StoreResult};
pub use error_log::{ErrorEntry, ErrorLog};
pub use freshness::{FreshnessEntry, FreshnessLog, DATE_FORMAT};
pub use queue::PendingQueue;
