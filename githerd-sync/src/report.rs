//! Plain-text rendering of per-repository progress lines and the final
//! run summary.

use githerd_core::{Outcome, RepoRecord, RunSummary};

/// One line per processed repository, printed as the run progresses.
pub fn progress_line(repo: &RepoRecord, outcome: &Outcome) -> String {
    let rel = repo.relative_path.display();
    match outcome {
        Outcome::Success => format!("✓ {rel} ({}) — synchronized", repo.kind),
        Outcome::NoChanges => format!("· {rel} ({}) — no changes", repo.kind),
        Outcome::Failure { reason, .. } => format!("✗ {rel} ({}) — {reason}", repo.kind),
    }
}

/// The end-of-run summary. Distinguishes "fully synchronized" from "needs
/// attention" and itemizes failures as a copy-pasteable list.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{} repositories scanned in {} ms: {} synchronized, {} unchanged, {} failed\n",
        summary.scanned,
        summary.duration_ms,
        summary.succeeded,
        summary.unchanged,
        summary.failures.len(),
    ));

    if summary.fully_synchronized() {
        out.push_str("All repositories fully synchronized.\n");
        return out;
    }

    out.push_str("Needs attention:\n");
    for failure in &summary.failures {
        out.push_str(&format!(
            "  ✗ {} ({}): {}\n",
            failure.name,
            failure.relative_path.display(),
            failure.reason,
        ));
        if let Some(suggestion) = &failure.suggestion {
            out.push_str(&format!("      try: {suggestion}\n"));
        }
    }
    out
}
