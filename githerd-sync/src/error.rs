//! Error types for githerd-sync.

use thiserror::Error;

use githerd_discovery::DiscoveryError;

/// All errors that can arise from sync operations. Per-repository failures
/// are *not* errors — they are [`Outcome::Failure`](githerd_core::Outcome)
/// data; this enum covers only faults that prevent running at all.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from repository discovery.
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Failed to spawn an external process (usually: git not on PATH).
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Spawn`].
pub(crate) fn spawn_err(program: impl Into<String>, source: std::io::Error) -> SyncError {
    SyncError::Spawn {
        program: program.into(),
        source,
    }
}
