//! Githerd — keep every git repository under a directory committed and pushed.
//!
//! # Usage
//!
//! ```text
//! githerd [PATH]                 watch PATH (default: .), rescanning every 5 minutes
//! githerd [PATH] --once          run a single scan/sync cycle and exit
//! githerd [PATH] --once --json   same, printing the summary as JSON
//! githerd --interval 60          rescan every 60 seconds
//! githerd --nested               also scan below repository roots for nested repos
//! githerd --no-oracle            skip commit-message generators; use timestamp messages
//! githerd --deny logs --deny tmp add directory names to the scan denylist
//! ```
//!
//! While watching, single-key commands on stdin: `r` rescans now, `R`
//! restarts the process, `q` quits.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use githerd_core::ScanConfig;
use githerd_daemon::{restart, start_blocking, ExitAction};
use githerd_sync::{pipeline, report};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "githerd",
    version,
    about = "Auto-commit and push every git repository under a directory",
    long_about = None,
)]
struct Cli {
    /// Directory to scan for git repositories.
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Run one scan/sync cycle and exit instead of watching.
    #[arg(long)]
    once: bool,

    /// Print the cycle summary as JSON (single-cycle mode only).
    #[arg(long, requires = "once")]
    json: bool,

    /// Seconds between periodic rescans while watching.
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    interval: u64,

    /// Keep scanning below repository roots for nested repositories.
    #[arg(long)]
    nested: bool,

    /// Never call external commit-message or advice tools.
    #[arg(long)]
    no_oracle: bool,

    /// Extra directory name to skip while scanning (repeatable).
    #[arg(long, value_name = "NAME")]
    deny: Vec<String>,
}

impl Cli {
    fn to_config(&self) -> Result<ScanConfig> {
        let root = self
            .path
            .canonicalize()
            .with_context(|| format!("cannot resolve scan root '{}'", self.path.display()))?;

        let mut config = ScanConfig::new(root);
        config.include_nested = self.nested;
        config.use_oracle = !self.no_oracle;
        config.interval = Duration::from_secs(self.interval.max(1));
        config.denylist.extend(self.deny.iter().cloned());
        Ok(config)
    }
}

fn run_once(config: &ScanConfig, json: bool) -> Result<()> {
    let summary = pipeline::run(config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", report::render_summary(&summary));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.to_config()?;

    if cli.once {
        return run_once(&config, cli.json);
    }

    match start_blocking(config)? {
        ExitAction::Quit => Ok(()),
        ExitAction::Restart => {
            restart::respawn()?;
            Ok(())
        }
    }
}
