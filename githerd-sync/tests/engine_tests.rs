//! End-to-end engine and pipeline tests against real git repositories.
//!
//! Every test builds throwaway repositories in a `TempDir`, with bare
//! directories standing in for remotes, so no network or credentials are
//! ever involved.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use githerd_core::{Outcome, RepoKind, RepoRecord, ScanConfig};
use githerd_sync::{pipeline, SyncEngine};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Git fixture helpers
// ---------------------------------------------------------------------------

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {args:?} in {} failed: {}{}",
        dir.display(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn init_repo(dir: &Path) {
    fs::create_dir_all(dir).expect("mkdir");
    git(dir, &["init", "--quiet"]);
    git(dir, &["config", "user.email", "herd@test.invalid"]);
    git(dir, &["config", "user.name", "herd tester"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

fn make_bare(dir: &Path) -> PathBuf {
    fs::create_dir_all(dir).expect("mkdir");
    git(dir, &["init", "--quiet", "--bare"]);
    dir.to_path_buf()
}

fn commit_file(repo: &Path, name: &str, content: &str, message: &str) {
    fs::write(repo.join(name), content).expect("write file");
    git(repo, &["add", "--all"]);
    git(repo, &["commit", "--quiet", "-m", message]);
}

fn commit_count(repo: &Path) -> u32 {
    git(repo, &["rev-list", "--count", "HEAD"])
        .parse()
        .expect("commit count")
}

fn record(repo: &Path, root: &Path) -> RepoRecord {
    RepoRecord {
        path: repo.to_path_buf(),
        relative_path: repo.strip_prefix(root).unwrap_or(repo).to_path_buf(),
        kind: RepoKind::Nested,
        is_monorepo: false,
    }
}

/// Oracle-free config so commits always use the timestamp fallback message.
fn config(root: &Path) -> ScanConfig {
    let mut cfg = ScanConfig::new(root);
    cfg.use_oracle = false;
    cfg.include_nested = true;
    cfg
}

fn engine(root: &Path) -> SyncEngine {
    SyncEngine::new(&config(root))
}

// ---------------------------------------------------------------------------
// Skip / idempotence
// ---------------------------------------------------------------------------

#[test]
fn clean_repo_without_remote_is_no_changes_twice() {
    let root = TempDir::new().expect("root");
    let repo = root.path().join("app");
    init_repo(&repo);
    commit_file(&repo, "README.md", "hello", "initial");

    let engine = engine(root.path());
    let rec = record(&repo, root.path());

    assert_eq!(engine.sync_repo(&rec), Outcome::NoChanges);
    assert_eq!(engine.sync_repo(&rec), Outcome::NoChanges);
    // No commit was created by either run.
    assert_eq!(commit_count(&repo), 1);
}

#[test]
fn repo_even_with_upstream_is_no_changes() {
    let root = TempDir::new().expect("root");
    let bare = make_bare(&root.path().join("origin.git"));
    let repo = root.path().join("app");
    init_repo(&repo);
    commit_file(&repo, "a.txt", "a", "initial");
    git(&repo, &["remote", "add", "origin", &bare.to_string_lossy()]);
    let branch = git(&repo, &["branch", "--show-current"]);
    git(&repo, &["push", "--quiet", "--set-upstream", "origin", &branch]);

    let outcome = engine(root.path()).sync_repo(&record(&repo, root.path()));
    assert_eq!(outcome, Outcome::NoChanges);
    assert_eq!(commit_count(&repo), 1);
}

// ---------------------------------------------------------------------------
// Stage → commit → push
// ---------------------------------------------------------------------------

#[test]
fn untracked_files_are_committed_and_pushed_with_set_upstream() {
    let root = TempDir::new().expect("root");
    let bare = make_bare(&root.path().join("origin.git"));
    let repo = root.path().join("app");
    init_repo(&repo);
    git(&repo, &["remote", "add", "origin", &bare.to_string_lossy()]);
    fs::write(repo.join("one.txt"), "1").expect("write");
    fs::write(repo.join("two.txt"), "2").expect("write");

    let outcome = engine(root.path()).sync_repo(&record(&repo, root.path()));
    assert_eq!(outcome, Outcome::Success);

    // One commit, carrying the timestamp fallback message.
    assert_eq!(commit_count(&repo), 1);
    let message = git(&repo, &["log", "-1", "--format=%s"]);
    assert!(
        message.starts_with("Auto-commit by githerd at "),
        "got: {message}"
    );

    // The remote received exactly that commit, and the upstream is set.
    let branch = git(&repo, &["branch", "--show-current"]);
    let local_head = git(&repo, &["rev-parse", "HEAD"]);
    let remote_head = git(&bare, &["rev-parse", &branch]);
    assert_eq!(local_head, remote_head);
    git(&repo, &["rev-parse", "--abbrev-ref", "@{u}"]);
}

#[test]
fn unpushed_commits_with_clean_tree_are_pushed_without_a_new_commit() {
    let root = TempDir::new().expect("root");
    let bare = make_bare(&root.path().join("origin.git"));
    let repo = root.path().join("app");
    init_repo(&repo);
    commit_file(&repo, "a.txt", "a", "initial");
    git(&repo, &["remote", "add", "origin", &bare.to_string_lossy()]);
    let branch = git(&repo, &["branch", "--show-current"]);
    git(&repo, &["push", "--quiet", "--set-upstream", "origin", &branch]);
    commit_file(&repo, "b.txt", "b", "local work");

    let outcome = engine(root.path()).sync_repo(&record(&repo, root.path()));
    assert_eq!(outcome, Outcome::Success);

    // Push only: the two existing commits, nothing new.
    assert_eq!(commit_count(&repo), 2);
    assert_eq!(
        git(&repo, &["rev-parse", "HEAD"]),
        git(&bare, &["rev-parse", &branch])
    );
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

#[test]
fn diverged_remote_is_recovered_by_pull_then_retry() {
    let root = TempDir::new().expect("root");
    let bare = make_bare(&root.path().join("origin.git"));

    // Seed the remote through a first clone.
    let seed = root.path().join("seed");
    init_repo(&seed);
    commit_file(&seed, "base.txt", "base", "initial");
    git(&seed, &["remote", "add", "origin", &bare.to_string_lossy()]);
    let branch = git(&seed, &["branch", "--show-current"]);
    git(&seed, &["push", "--quiet", "--set-upstream", "origin", &branch]);

    // Second clone falls behind when the seed pushes again.
    let work = root.path().join("work");
    git(root.path(), &["clone", "--quiet", &bare.to_string_lossy(), "work"]);
    git(&work, &["config", "user.email", "herd@test.invalid"]);
    git(&work, &["config", "user.name", "herd tester"]);
    commit_file(&seed, "remote.txt", "from seed", "remote work");
    git(&seed, &["push", "--quiet"]);

    // Local divergent commit on a different file (clean merge).
    commit_file(&work, "local.txt", "from work", "local work");

    let outcome = engine(root.path()).sync_repo(&record(&work, root.path()));
    assert_eq!(outcome, Outcome::Success);

    // Remote now holds both sides of the divergence.
    let remote_head = git(&bare, &["rev-parse", &branch]);
    assert_eq!(git(&work, &["rev-parse", "HEAD"]), remote_head);
    let tree = git(&bare, &["ls-tree", "--name-only", &branch]);
    assert!(tree.contains("remote.txt"), "got: {tree}");
    assert!(tree.contains("local.txt"), "got: {tree}");
}

#[test]
fn conflicting_divergence_fails_after_bounded_remediation() {
    let root = TempDir::new().expect("root");
    let bare = make_bare(&root.path().join("origin.git"));

    let seed = root.path().join("seed");
    init_repo(&seed);
    commit_file(&seed, "base.txt", "line one\n", "initial");
    git(&seed, &["remote", "add", "origin", &bare.to_string_lossy()]);
    let branch = git(&seed, &["branch", "--show-current"]);
    git(&seed, &["push", "--quiet", "--set-upstream", "origin", &branch]);

    let work = root.path().join("work");
    git(root.path(), &["clone", "--quiet", &bare.to_string_lossy(), "work"]);
    git(&work, &["config", "user.email", "herd@test.invalid"]);
    git(&work, &["config", "user.name", "herd tester"]);

    // Both sides rewrite the same line, so neither a merge-pull nor a
    // rebase-pull can resolve the divergence.
    commit_file(&seed, "base.txt", "from seed\n", "remote edit");
    git(&seed, &["push", "--quiet"]);
    let remote_head = git(&bare, &["rev-parse", &branch]);
    fs::write(work.join("base.txt"), "from work\n").expect("write");

    let outcome = engine(root.path()).sync_repo(&record(&work, root.path()));
    match outcome {
        Outcome::Failure { reason, suggestion } => {
            assert!(reason.contains("pull remediation failed"), "got: {reason}");
            assert!(suggestion
                .expect("suggestion")
                .contains("resolve the merge conflict by hand"));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    // The bounded ladder gives up cleanly: the remote head is untouched
    // (no force-push), and only the one local commit was created.
    assert_eq!(git(&bare, &["rev-parse", &branch]), remote_head);
    let message = git(&work, &["log", "-1", "--format=%s", &branch]);
    assert!(
        message.starts_with("Auto-commit by githerd at "),
        "got: {message}"
    );
}

#[test]
fn missing_remote_repository_is_not_auto_fixed() {
    let root = TempDir::new().expect("root");
    let repo = root.path().join("app");
    init_repo(&repo);
    let gone = root.path().join("no-such-remote.git");
    git(&repo, &["remote", "add", "origin", &gone.to_string_lossy()]);
    fs::write(repo.join("a.txt"), "a").expect("write");

    let outcome = engine(root.path()).sync_repo(&record(&repo, root.path()));
    match outcome {
        Outcome::Failure { reason, suggestion } => {
            assert!(
                reason.contains("remote repository not found"),
                "got: {reason}"
            );
            assert!(suggestion.expect("suggestion").contains("git remote -v"));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    // The commit itself still went through; only the push is stuck.
    assert_eq!(commit_count(&repo), 1);
}

// ---------------------------------------------------------------------------
// Pipeline: failure isolation and ordering
// ---------------------------------------------------------------------------

#[test]
fn one_broken_repo_does_not_block_the_others() {
    let root = TempDir::new().expect("root");

    let good_a = root.path().join("a-ok");
    init_repo(&good_a);
    commit_file(&good_a, "a.txt", "a", "initial");

    // A directory that looks like a repo but is not one.
    let broken = root.path().join("m-broken");
    fs::create_dir_all(broken.join(".git")).expect("mkdir");

    let good_z = root.path().join("z-ok");
    init_repo(&good_z);
    commit_file(&good_z, "z.txt", "z", "initial");

    let summary = pipeline::run(&config(root.path())).expect("pipeline");
    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.unchanged, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].name, "m-broken");
    assert!(!summary.fully_synchronized());
}

#[test]
fn pipeline_counts_successes_and_no_changes() {
    let root = TempDir::new().expect("root");
    let bare = make_bare(&root.path().join("origin.git"));

    let dirty = root.path().join("dirty");
    init_repo(&dirty);
    git(&dirty, &["remote", "add", "origin", &bare.to_string_lossy()]);
    fs::write(dirty.join("new.txt"), "new").expect("write");

    let clean = root.path().join("clean");
    init_repo(&clean);
    commit_file(&clean, "c.txt", "c", "initial");

    let summary = pipeline::run(&config(root.path())).expect("pipeline");
    assert_eq!(summary.scanned, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.unchanged, 1);
    assert!(summary.fully_synchronized());
}
