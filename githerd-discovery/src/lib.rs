//! Repository discovery for githerd.
//!
//! [`discover`] walks the configured root depth-first and returns a
//! [`RepoRecord`] for every directory containing a `.git` entry, classified
//! as `main`, `submodule`, or `nested`, with monorepo detection. The walk
//! never descends into `.git` itself, denylisted directory names, or
//! symlinked directories, and an unreadable subtree is skipped rather than
//! aborting the scan.

use std::fs;
use std::path::{Path, PathBuf};

use githerd_core::{RepoKind, RepoRecord, ScanConfig};
use thiserror::Error;

/// Errors from repository discovery. Per-directory read errors are absorbed
/// by the walk; only a missing or non-directory root is fatal.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("scan root is not a directory: {path}")]
    RootNotADirectory { path: PathBuf },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Discover every repository beneath `config.root`, in processing order:
/// submodules first, nested repositories next, the main repository last.
pub fn discover(config: &ScanConfig) -> Result<Vec<RepoRecord>, DiscoveryError> {
    if !config.root.is_dir() {
        return Err(DiscoveryError::RootNotADirectory {
            path: config.root.clone(),
        });
    }

    let mut repos = Vec::new();
    walk(&config.root, config, &mut repos);
    sort_for_processing(&mut repos);
    Ok(repos)
}

/// Classify a repository path relative to the scan root.
pub fn classify(path: &Path, root: &Path) -> RepoKind {
    if path == root {
        return RepoKind::Main;
    }
    // Git's convention: a `.git` regular file holds a `gitdir:` pointer to
    // the real metadata directory — a submodule or linked worktree.
    if path.join(".git").is_file() {
        return RepoKind::Submodule;
    }
    RepoKind::Nested
}

/// A repository is a monorepo when it declares submodules or an immediate
/// child directory is itself a repository.
pub fn is_monorepo(path: &Path) -> bool {
    if path.join(".gitmodules").is_file() {
        return true;
    }
    let Ok(entries) = fs::read_dir(path) else {
        return false;
    };
    for entry in entries.flatten() {
        let child = entry.path();
        if !child.is_dir() || entry.file_name() == ".git" {
            continue;
        }
        if has_git_entry(&child) {
            return true;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

fn walk(dir: &Path, config: &ScanConfig, repos: &mut Vec<RepoRecord>) {
    let is_repo = has_git_entry(dir);
    if is_repo {
        repos.push(make_record(dir, config));
        if !config.include_nested {
            return;
        }
    }

    // Unreadable directory (permissions, race-deleted): skip the subtree.
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    // Sort by name for reproducible discovery order.
    let mut children: Vec<_> = entries.flatten().collect();
    children.sort_by_key(|e| e.file_name());

    for entry in children {
        let name = entry.file_name();
        if name == ".git" || config.is_denied(&name.to_string_lossy()) {
            continue;
        }
        // Symlinked directories are never followed (symlink loops are a
        // non-goal). file_type() on DirEntry does not traverse the link.
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_symlink() || !file_type.is_dir() {
            continue;
        }
        walk(&entry.path(), config, repos);
    }
}

fn has_git_entry(dir: &Path) -> bool {
    // A `.git` child of either kind marks a repository root: a directory for
    // ordinary repos, a file for submodules/linked worktrees.
    let dot_git = dir.join(".git");
    dot_git.is_dir() || dot_git.is_file()
}

fn make_record(path: &Path, config: &ScanConfig) -> RepoRecord {
    let relative_path = path
        .strip_prefix(&config.root)
        .map(|p| {
            if p.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                p.to_path_buf()
            }
        })
        .unwrap_or_else(|_| path.to_path_buf());

    RepoRecord {
        path: path.to_path_buf(),
        relative_path,
        kind: classify(path, &config.root),
        is_monorepo: is_monorepo(path),
    }
}

/// Leaf dependencies commit and push before the repository that references
/// them, so a parent never records an unpushed submodule commit.
fn sort_for_processing(repos: &mut [RepoRecord]) {
    repos.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.path.cmp(&b.path)));
}
