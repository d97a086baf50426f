//! # githerd-sync
//!
//! Per-repository stage/commit/push engine and the cycle pipeline.
//!
//! Call [`pipeline::run`] to execute one full scan cycle (discovery →
//! per-repository sync → aggregated [`RunSummary`]), or [`SyncEngine`]
//! directly for a single repository.

pub mod classify;
pub mod engine;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod report;
pub mod status;

pub use classify::FailureKind;
pub use engine::{fallback_commit_message, SyncEngine};
pub use error::SyncError;
pub use githerd_core::RunSummary;
