//! Push/commit failure classification.
//!
//! Recovery decisions are made by substring-matching lower-cased git error
//! text. That matching is inherently fragile against reworded tool output,
//! so it lives behind this single function mapping raw text to a closed
//! [`FailureKind`] — nothing else in the engine inspects raw strings.

/// Closed taxonomy of git operation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No upstream tracking branch configured for the current branch.
    NoUpstream,
    /// Remote has commits the local branch lacks (non-fast-forward).
    Diverged,
    /// The remote repository does not exist or is unreachable as a repo.
    RemoteMissing,
    /// SSH host key verification failed.
    HostKeyFailed,
    /// Authentication / permission / access-rights error.
    PermissionDenied,
    /// The staged tree matched HEAD — a benign no-op, not a real failure.
    NothingToCommit,
    /// Anything else.
    Unknown,
}

impl FailureKind {
    /// Kinds that require credentials or remote-side action a tool cannot
    /// take; no auto-remediation is attempted for them.
    pub fn is_auto_fixable(self) -> bool {
        !matches!(
            self,
            FailureKind::RemoteMissing
                | FailureKind::HostKeyFailed
                | FailureKind::PermissionDenied
        )
    }

    /// Short human-readable description used in failure reasons.
    pub fn describe(self) -> &'static str {
        match self {
            FailureKind::NoUpstream => "no upstream tracking branch configured",
            FailureKind::Diverged => "remote has new commits (non-fast-forward)",
            FailureKind::RemoteMissing => "remote repository not found",
            FailureKind::HostKeyFailed => "SSH host key verification failed",
            FailureKind::PermissionDenied => "permission or access-rights error",
            FailureKind::NothingToCommit => "nothing to commit",
            FailureKind::Unknown => "unclassified git failure",
        }
    }

    /// Remedial command offered in the end-of-run failure list.
    pub fn suggested_command(self) -> Option<&'static str> {
        match self {
            FailureKind::NoUpstream => Some("git push --set-upstream origin <branch>"),
            FailureKind::Diverged => Some("git pull --rebase && git push"),
            FailureKind::RemoteMissing => Some("git remote -v  # verify the remote URL"),
            FailureKind::HostKeyFailed => {
                Some("ssh -T <remote-host>  # accept the host key, then push")
            }
            FailureKind::PermissionDenied => {
                Some("check credentials / repository access rights, then git push")
            }
            FailureKind::NothingToCommit | FailureKind::Unknown => None,
        }
    }
}

/// Map raw git error text to a [`FailureKind`]. Order matters: the more
/// specific, non-auto-fixable kinds are checked before divergence.
pub fn classify_failure(text: &str) -> FailureKind {
    let text = text.to_lowercase();
    let has = |needle: &str| text.contains(needle);

    if has("host key verification failed") {
        FailureKind::HostKeyFailed
    } else if has("permission denied")
        || has("access denied")
        || has("authentication failed")
        || has("403")
    {
        FailureKind::PermissionDenied
    } else if has("repository not found") || has("does not appear to be a git repository") {
        FailureKind::RemoteMissing
    } else if has("fetch first")
        || has("non-fast-forward")
        || has("updates were rejected")
        || has("tip of your current branch is behind")
    {
        FailureKind::Diverged
    } else if has("no upstream branch")
        || has("no configured push destination")
        || has("--set-upstream")
    {
        FailureKind::NoUpstream
    } else if has("nothing to commit") || has("nothing added to commit") {
        FailureKind::NothingToCommit
    } else {
        FailureKind::Unknown
    }
}

/// Truncate raw error text to a readable length for reporting.
pub fn short_error(text: &str, max_chars: usize) -> String {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flattened.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &flattened[..idx]),
        None => flattened,
    }
}
