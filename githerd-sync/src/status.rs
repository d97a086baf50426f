//! Change-status inspection.
//!
//! Derived fresh per repository per cycle from a single branch-aware
//! porcelain status call plus a best-effort remote lookup; never cached.

use std::path::Path;

use githerd_core::ChangeStatus;

use crate::error::SyncError;
use crate::git;

/// Inspection result: the change flags plus the changed-path list (reused
/// for the commit-message prompt so status is only run once).
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    pub status: ChangeStatus,
    pub changed_files: Vec<String>,
}

/// Inspect a repository. Returns `Err` only when git itself cannot run;
/// a repository in a broken state yields `Ok` with git's complaint surfaced
/// later by the engine's first mutating command.
pub fn inspect(repo: &Path) -> Result<Result<StatusReport, String>, SyncError> {
    let out = git::status_branch_porcelain(repo)?;
    if !out.success {
        // Not a usable repository (corrupt .git, etc.) — report the text.
        return Ok(Err(out.error_text()));
    }

    let header = out.stdout.lines().find(|l| l.starts_with("##"));
    let changed_files = git::changed_files(&out.stdout);

    let status = ChangeStatus {
        has_uncommitted: !changed_files.is_empty(),
        has_unpushed: header.map(branch_is_ahead).unwrap_or(false),
        remote: git::first_remote(repo)?.map(|(name, url)| format!("{name} → {url}")),
    };

    Ok(Ok(StatusReport {
        status,
        changed_files,
    }))
}

/// `## main...origin/main [ahead 2]` → true. A branch without an upstream
/// has no bracket section at all, which reads as "nothing unpushed" here —
/// upstream absence is discovered and handled during push.
fn branch_is_ahead(header: &str) -> bool {
    match header.find('[') {
        Some(idx) => header[idx..].contains("ahead"),
        None => false,
    }
}
