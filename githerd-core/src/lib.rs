//! Githerd core library — domain types and scan configuration.
//!
//! Public API surface:
//! - [`types`] — repository records, change status, outcomes, run summary
//! - [`config`] — [`ScanConfig`] with denylist, oracle tools, and timeouts

pub mod config;
pub mod types;

pub use config::{OracleTool, PromptVia, ScanConfig};
pub use types::{ChangeStatus, Outcome, RepoFailure, RepoKind, RepoRecord, RunSummary};
