//! Shared scan-cycle entrypoint used by the CLI one-shot mode and the
//! daemon's scan processor.

use std::time::Instant;

use githerd_core::{RunSummary, ScanConfig};

use crate::engine::SyncEngine;
use crate::error::SyncError;
use crate::report;

/// Run one full cycle: discover, sort, sync each repository in order, and
/// aggregate outcomes. One broken repository never stops the rest — failure
/// isolation across repositories is a hard requirement.
pub fn run(config: &ScanConfig) -> Result<RunSummary, SyncError> {
    let started = Instant::now();
    let repos = githerd_discovery::discover(config)?;
    tracing::info!("discovered {} repositories under {}", repos.len(), config.root.display());

    let engine = SyncEngine::new(config);
    let mut summary = RunSummary::default();

    for repo in &repos {
        let outcome = engine.sync_repo(repo);
        println!("{}", report::progress_line(repo, &outcome));
        summary.record(repo, &outcome);
    }

    summary.duration_ms = started.elapsed().as_millis();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_root_yields_empty_summary() {
        let root = TempDir::new().expect("root");
        let config = ScanConfig::new(root.path());
        let summary = run(&config).expect("run");
        assert_eq!(summary.scanned, 0);
        assert!(summary.fully_synchronized());
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = TempDir::new().expect("root");
        let config = ScanConfig::new(root.path().join("gone"));
        assert!(run(&config).is_err());
    }
}
