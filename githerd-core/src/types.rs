//! Domain types for a githerd scan cycle.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem
//! paths. Everything here is scoped to a single cycle — nothing is persisted
//! across scans.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a discovered repository relates to the scan root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoKind {
    /// `.git` entry is a regular file — a submodule / linked worktree.
    Submodule,
    /// A repository found below the scan root that is not the root itself.
    Nested,
    /// The scan root itself.
    Main,
}

impl fmt::Display for RepoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoKind::Submodule => write!(f, "submodule"),
            RepoKind::Nested => write!(f, "nested"),
            RepoKind::Main => write!(f, "main"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One repository found by discovery. Immutable after creation; lives only
/// for the duration of a single cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRecord {
    /// Absolute path to the repository root.
    pub path: PathBuf,
    /// Path relative to the scan root (`.` for the root itself).
    pub relative_path: PathBuf,
    pub kind: RepoKind,
    /// True when the repo references further repos (`.gitmodules` present,
    /// or an immediate child directory is itself a repository).
    pub is_monorepo: bool,
}

impl RepoRecord {
    /// Directory name used in reports. The scan root reports its own name.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Transient per-repository state, derived fresh each cycle and never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeStatus {
    pub has_uncommitted: bool,
    pub has_unpushed: bool,
    /// Best-effort `"<remote> → <url>"` for reporting; absence is not an error.
    pub remote: Option<String>,
}

impl ChangeStatus {
    /// A repository with neither change type is skipped entirely.
    pub fn is_clean(&self) -> bool {
        !self.has_uncommitted && !self.has_unpushed
    }
}

/// Result of processing one repository. Exactly one variant holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    NoChanges,
    Failure {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        suggestion: Option<String>,
    },
}

impl Outcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        Outcome::Failure {
            reason: reason.into(),
            suggestion: None,
        }
    }

    pub fn failure_with_suggestion(reason: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Outcome::Failure {
            reason: reason.into(),
            suggestion: Some(suggestion.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure { .. })
    }
}

/// One entry in the end-of-run failure list — intended to be copy-pasteable
/// for hand-off to a human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFailure {
    pub name: String,
    pub relative_path: PathBuf,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Aggregated result of one full scan cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub scanned: usize,
    pub succeeded: usize,
    pub unchanged: usize,
    pub failures: Vec<RepoFailure>,
    pub duration_ms: u128,
}

impl RunSummary {
    /// Fold one repository's outcome into the summary.
    pub fn record(&mut self, repo: &RepoRecord, outcome: &Outcome) {
        self.scanned += 1;
        match outcome {
            Outcome::Success => self.succeeded += 1,
            Outcome::NoChanges => self.unchanged += 1,
            Outcome::Failure { reason, suggestion } => self.failures.push(RepoFailure {
                name: repo.name(),
                relative_path: repo.relative_path.clone(),
                reason: reason.clone(),
                suggestion: suggestion.clone(),
            }),
        }
    }

    /// True when every repository ended in `Success` or `NoChanges`.
    pub fn fully_synchronized(&self) -> bool {
        self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
