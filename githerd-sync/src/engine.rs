//! The per-repository sync engine.
//!
//! One repository, one cycle: inspect → (stage → commit) → push, with a
//! bounded recovery ladder for push failures. Every git-level failure is
//! returned as [`Outcome`] data; the only hard errors are "git cannot be
//! spawned at all".

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use githerd_core::{Outcome, RepoRecord, ScanConfig};
use githerd_oracle::{prompt, TextOracle};

use crate::classify::{classify_failure, short_error, FailureKind};
use crate::error::SyncError;
use crate::git;
use crate::status::{self, StatusReport};

/// Readable cap on raw git error text in failure reasons.
const MAX_REASON_CHARS: usize = 200;

/// Deterministic fallback used when every commit-message oracle fails.
pub fn fallback_commit_message(now: DateTime<Utc>) -> String {
    format!(
        "Auto-commit by githerd at {}",
        now.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Sync engine for one scan cycle. Holds the oracle chains so candidate
/// tool lookups happen once per cycle, not once per repository.
pub struct SyncEngine {
    commit_oracle: Option<TextOracle>,
    advice_oracle: Option<TextOracle>,
}

impl SyncEngine {
    pub fn new(config: &ScanConfig) -> Self {
        let (commit_oracle, advice_oracle) = if config.use_oracle {
            (
                Some(TextOracle::for_commit_messages(config)),
                Some(TextOracle::for_advice(config)),
            )
        } else {
            (None, None)
        };
        Self {
            commit_oracle,
            advice_oracle,
        }
    }

    /// Process one repository. Never panics, never returns an error — every
    /// failure becomes `Outcome::Failure` so one broken repository cannot
    /// block the rest of the run.
    pub fn sync_repo(&self, repo: &RepoRecord) -> Outcome {
        match self.run(repo) {
            Ok(outcome) => outcome,
            Err(err) => Outcome::failure(err.to_string()),
        }
    }

    fn run(&self, repo: &RepoRecord) -> Result<Outcome, SyncError> {
        let report = match status::inspect(&repo.path)? {
            Ok(report) => report,
            Err(text) => {
                return Ok(Outcome::failure(format!(
                    "status failed: {}",
                    short_error(&text, MAX_REASON_CHARS)
                )));
            }
        };

        if report.status.is_clean() {
            return Ok(Outcome::NoChanges);
        }

        if let Some(remote) = &report.status.remote {
            tracing::debug!("{}: remote {remote}", repo.name());
        }

        // Uncommitted changes gate stage+commit; unpushed commits gate push.
        // The two are independent.
        let mut committed = false;
        if report.status.has_uncommitted {
            match self.stage_and_commit(repo, &report)? {
                CommitResult::Committed => committed = true,
                CommitResult::NothingToCommit => {}
                CommitResult::Failed(outcome) => return Ok(outcome),
            }
        }

        if !committed && !report.status.has_unpushed {
            // Staging produced no net change and nothing was waiting to be
            // pushed — behaviorally a no-op.
            return Ok(Outcome::NoChanges);
        }

        self.push_with_recovery(&repo.path)
    }

    fn stage_and_commit(
        &self,
        repo: &RepoRecord,
        report: &StatusReport,
    ) -> Result<CommitResult, SyncError> {
        let add = git::add_all(&repo.path)?;
        if !add.success {
            return Ok(CommitResult::Failed(Outcome::failure(format!(
                "staging failed: {}",
                short_error(&add.error_text(), MAX_REASON_CHARS)
            ))));
        }

        let message = self.commit_message(repo, report);
        let commit = git::commit(&repo.path, &message)?;
        if commit.success {
            tracing::debug!("{}: committed \"{message}\"", repo.name());
            return Ok(CommitResult::Committed);
        }

        // "nothing to commit" lands on stdout, real errors on stderr.
        let text = format!("{}\n{}", commit.stdout, commit.stderr);
        match classify_failure(&text) {
            FailureKind::NothingToCommit => Ok(CommitResult::NothingToCommit),
            _ => Ok(CommitResult::Failed(Outcome::failure(format!(
                "commit failed: {}",
                short_error(&text, MAX_REASON_CHARS)
            )))),
        }
    }

    fn commit_message(&self, repo: &RepoRecord, report: &StatusReport) -> String {
        if let Some(oracle) = &self.commit_oracle {
            let stat = git::diff_stat(&repo.path).unwrap_or_default();
            let ask = prompt::commit_message(&report.changed_files, &stat);
            if let Some(message) = oracle.ask(&ask) {
                return message;
            }
            tracing::debug!("{}: no oracle produced a message", repo.name());
        }
        fallback_commit_message(Utc::now())
    }

    // -----------------------------------------------------------------------
    // Push + bounded recovery
    // -----------------------------------------------------------------------

    fn push_with_recovery(&self, repo: &Path) -> Result<Outcome, SyncError> {
        let push = git::push(repo)?;
        if push.success {
            return Ok(Outcome::Success);
        }

        let text = push.error_text();
        match classify_failure(&text) {
            FailureKind::NoUpstream => self.push_setting_upstream(repo),
            kind => self.recover(repo, kind, &text),
        }
    }

    /// No upstream configured: retry once, setting the upstream explicitly
    /// to `<remote>/<current-branch>`.
    fn push_setting_upstream(&self, repo: &Path) -> Result<Outcome, SyncError> {
        let remote = git::first_remote(repo)?
            .map(|(name, _)| name)
            .unwrap_or_else(|| "origin".to_string());
        let Some(branch) = git::current_branch(repo)? else {
            return Ok(Outcome::failure("cannot push: detached HEAD"));
        };

        let push = git::push_set_upstream(repo, &remote, &branch)?;
        if push.success {
            return Ok(Outcome::Success);
        }
        let text = push.error_text();
        self.recover(repo, classify_failure(&text), &text)
    }

    /// Bounded remediation: at most one merge-pull, one rebase-pull (only if
    /// the merge-pull failed), one advice-oracle consult, and one push retry.
    fn recover(&self, repo: &Path, kind: FailureKind, text: &str) -> Result<Outcome, SyncError> {
        if !kind.is_auto_fixable() {
            // Needs credentials or remote-side action; a retry cannot help.
            return Ok(failure_outcome(kind, text));
        }

        if kind == FailureKind::Diverged {
            let pulled = git::pull_merge(repo)?.success || git::pull_rebase(repo)?.success;
            if !pulled {
                return Ok(Outcome::failure_with_suggestion(
                    format!("push rejected ({}) and pull remediation failed", kind.describe()),
                    "resolve the merge conflict by hand, then git push",
                ));
            }
            return self.retry_push_once(repo);
        }

        // Unclassified failure: ask the advice oracle for a one-liner; act
        // only on a plain-pull suggestion.
        if let Some(oracle) = &self.advice_oracle {
            if let Some(advice) = oracle.ask(&prompt::push_advice(text)) {
                tracing::info!("advice oracle suggests: {advice}");
                if advice.to_lowercase().contains("pull") && git::pull_merge(repo)?.success {
                    return self.retry_push_once(repo);
                }
            }
        }

        Ok(failure_outcome(kind, text))
    }

    /// The single post-remediation retry. A second failure escalates with
    /// whatever the retry reported — no loop.
    fn retry_push_once(&self, repo: &Path) -> Result<Outcome, SyncError> {
        let push = git::push(repo)?;
        if push.success {
            return Ok(Outcome::Success);
        }
        let text = push.error_text();
        Ok(failure_outcome(classify_failure(&text), &text))
    }
}

enum CommitResult {
    Committed,
    NothingToCommit,
    Failed(Outcome),
}

fn failure_outcome(kind: FailureKind, text: &str) -> Outcome {
    let reason = match kind {
        FailureKind::Unknown => {
            format!("push failed: {}", short_error(text, MAX_REASON_CHARS))
        }
        _ => format!("push failed: {}", kind.describe()),
    };
    match kind.suggested_command() {
        Some(command) => Outcome::failure_with_suggestion(reason, command),
        None => Outcome::failure(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_message_carries_marker_and_valid_timestamp() {
        let message = fallback_commit_message(Utc::now());
        assert!(message.starts_with("Auto-commit by githerd at "));

        let stamp = message
            .strip_prefix("Auto-commit by githerd at ")
            .expect("prefix");
        chrono::DateTime::parse_from_rfc3339(stamp).expect("valid ISO-8601 timestamp");
    }

    #[test]
    fn unrecoverable_failure_carries_suggestion() {
        let outcome = failure_outcome(FailureKind::RemoteMissing, "ERROR: Repository not found.");
        match outcome {
            Outcome::Failure { reason, suggestion } => {
                assert!(reason.contains("remote repository not found"));
                assert!(suggestion.expect("suggestion").contains("git remote -v"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn unknown_failure_reports_truncated_raw_text() {
        let long = "error: ".to_string() + &"x".repeat(1_000);
        let outcome = failure_outcome(FailureKind::Unknown, &long);
        match outcome {
            Outcome::Failure { reason, suggestion } => {
                assert!(reason.len() < 300, "reason should be truncated");
                assert!(suggestion.is_none());
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
