//! Graceful restart: launch a fresh process image with identical invocation
//! arguments, then let the current process exit with success status.

use std::env;

use crate::error::{io_err, DaemonError};

/// Spawn a new copy of the current executable with the original argv.
/// The child inherits stdio (it takes over the terminal); the caller is
/// expected to exit 0 right after.
pub fn respawn() -> Result<(), DaemonError> {
    let exe = env::current_exe().map_err(|e| io_err("current_exe", e))?;
    let args: Vec<_> = env::args_os().skip(1).collect();

    tracing::info!("restarting: {} {:?}", exe.display(), args);
    std::process::Command::new(&exe)
        .args(args)
        .spawn()
        .map_err(|e| io_err(exe, e))?;
    Ok(())
}
