// Thu Oct 15 2026 - Alex

pub mod failure;
pub mod integrity;
pub mod machine;

pub use failure::{RetrievalFailure, Severity};
pub use integrity::{IntegrityCheck, IntegrityIssue};
pub use machine::{Retrieval, RetrievalMachine, RetrievalSettings, RetrievalState, StateKind};
