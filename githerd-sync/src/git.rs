//! Thin wrappers around the system `git` binary.
//!
//! This uses the installed git command, which automatically handles SSH
//! keys, credential helpers, and anything else configured in the user's
//! environment. Git is treated as a correct, already-atomic subsystem; a
//! non-zero exit is captured as data in [`GitOutput`], never a panic.

use std::path::Path;
use std::process::Command;

use crate::error::{spawn_err, SyncError};

/// Captured result of one git invocation.
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// Error text for classification: stderr first, stdout as fallback
    /// (git writes some push diagnostics to stdout).
    pub fn error_text(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Run `git <args>` inside `repo`, capturing output.
pub fn git(repo: &Path, args: &[&str]) -> Result<GitOutput, SyncError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .map_err(|e| spawn_err("git", e))?;

    Ok(GitOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

// ---------------------------------------------------------------------------
// The fixed command set
// ---------------------------------------------------------------------------

/// Branch-aware porcelain status: `## <branch>...` header plus one line per
/// changed path.
pub fn status_branch_porcelain(repo: &Path) -> Result<GitOutput, SyncError> {
    git(repo, &["status", "--porcelain", "--branch"])
}

/// Name of the currently checked-out branch; `None` when detached.
pub fn current_branch(repo: &Path) -> Result<Option<String>, SyncError> {
    let out = git(repo, &["branch", "--show-current"])?;
    let name = out.stdout.trim();
    if out.success && !name.is_empty() {
        Ok(Some(name.to_string()))
    } else {
        Ok(None)
    }
}

/// First configured remote as `(name, url)`, parsed from `git remote -v`
/// fetch lines. Absence is not an error.
pub fn first_remote(repo: &Path) -> Result<Option<(String, String)>, SyncError> {
    let out = git(repo, &["remote", "-v"])?;
    if !out.success {
        return Ok(None);
    }
    for line in out.stdout.lines() {
        if !line.ends_with("(fetch)") {
            continue;
        }
        // Format: `<name>\t<url> (fetch)`
        let mut parts = line.split_whitespace();
        if let (Some(name), Some(url)) = (parts.next(), parts.next()) {
            return Ok(Some((name.to_string(), url.to_string())));
        }
    }
    Ok(None)
}

/// Stage everything: new files, modifications, and deletions, respecting
/// ignore rules. Blanket staging is deliberate — selective staging is a
/// non-goal.
pub fn add_all(repo: &Path) -> Result<GitOutput, SyncError> {
    git(repo, &["add", "--all"])
}

pub fn commit(repo: &Path, message: &str) -> Result<GitOutput, SyncError> {
    git(repo, &["commit", "-m", message])
}

pub fn push(repo: &Path) -> Result<GitOutput, SyncError> {
    git(repo, &["push"])
}

pub fn push_set_upstream(repo: &Path, remote: &str, branch: &str) -> Result<GitOutput, SyncError> {
    git(repo, &["push", "--set-upstream", remote, branch])
}

pub fn pull_merge(repo: &Path) -> Result<GitOutput, SyncError> {
    git(repo, &["pull", "--no-rebase"])
}

pub fn pull_rebase(repo: &Path) -> Result<GitOutput, SyncError> {
    git(repo, &["pull", "--rebase"])
}

/// Diff statistics for the oracle prompt. Empty on a repository without a
/// HEAD yet (first commit) — the prompt builder tolerates that.
pub fn diff_stat(repo: &Path) -> Result<String, SyncError> {
    let out = git(repo, &["diff", "--stat", "HEAD"])?;
    if out.success {
        Ok(out.stdout)
    } else {
        Ok(String::new())
    }
}

/// Changed file paths from porcelain status lines (`XY <path>`).
pub fn changed_files(porcelain: &str) -> Vec<String> {
    porcelain
        .lines()
        .filter(|line| !line.starts_with("##") && line.len() > 3)
        .map(|line| line[3..].trim().to_string())
        .filter(|path| !path.is_empty())
        .collect()
}
