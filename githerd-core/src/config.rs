//! Scan configuration.
//!
//! There is no config file format — the denylist, intervals, and oracle tool
//! lists are process configuration assembled from CLI flags and defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Default rescan interval for the periodic trigger.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

/// Hard wall-clock bound on a single oracle invocation.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Bound on captured oracle stdout.
pub const DEFAULT_ORACLE_MAX_OUTPUT: usize = 16 * 1024;

/// Directory names never descended into, regardless of depth. Build output,
/// dependency folders, and editor metadata — not domain logic.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "node_modules",
    "vendor",
    "target",
    "dist",
    "build",
    "out",
    ".idea",
    ".vscode",
    ".cache",
    "__pycache__",
    ".next",
    ".venv",
];

/// How a prompt reaches an external oracle tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVia {
    /// Appended as the final command-line argument.
    Arg,
    /// Written to the tool's standard input.
    Stdin,
}

/// One candidate external text-generation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleTool {
    pub program: String,
    pub args: Vec<String>,
    pub prompt_via: PromptVia,
}

impl OracleTool {
    pub fn new(program: &str, args: &[&str], prompt_via: PromptVia) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            prompt_via,
        }
    }
}

/// Prioritized default candidates for commit-message generation. The first
/// installed tool that produces non-empty output wins.
pub fn default_commit_tools() -> Vec<OracleTool> {
    vec![
        OracleTool::new("claude", &["-p"], PromptVia::Arg),
        OracleTool::new("gemini", &["-p"], PromptVia::Arg),
        OracleTool::new("codex", &["exec"], PromptVia::Arg),
        OracleTool::new("aichat", &[], PromptVia::Stdin),
    ]
}

/// Prioritized default candidates for push-failure advice. Same tools; the
/// prompt differs.
pub fn default_advice_tools() -> Vec<OracleTool> {
    default_commit_tools()
}

/// Configuration for one scan cycle (and for the daemon's periodic trigger).
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Absolute scan root.
    pub root: PathBuf,
    /// Directory names never descended into.
    pub denylist: Vec<String>,
    /// Keep scanning below discovered repository roots for nested repos.
    pub include_nested: bool,
    /// Disable every oracle call; the timestamp fallback message is used.
    pub use_oracle: bool,
    pub commit_tools: Vec<OracleTool>,
    pub advice_tools: Vec<OracleTool>,
    pub oracle_timeout: Duration,
    pub oracle_max_output: usize,
    /// Periodic rescan interval.
    pub interval: Duration,
}

impl ScanConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
            include_nested: false,
            use_oracle: true,
            commit_tools: default_commit_tools(),
            advice_tools: default_advice_tools(),
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
            oracle_max_output: DEFAULT_ORACLE_MAX_OUTPUT,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn is_denied(&self, dir_name: &str) -> bool {
        self.denylist.iter().any(|d| d == dir_name)
    }
}
