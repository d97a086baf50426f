//! External text oracles for githerd.
//!
//! A [`TextOracle`] is an ordered list of candidate external commands treated
//! as black-box functions from a text prompt to a text response. Each
//! candidate is tried in priority order, guarded by an existence check, a
//! hard wall-clock timeout, and a bounded output buffer; the first candidate
//! that produces non-empty output wins, and only its first output line is
//! authoritative. Every failure mode — missing binary, non-zero exit,
//! timeout, empty output — is absorbed and logged, never propagated.
//!
//! The same abstraction serves both commit-message generation and
//! push-failure advice; only the prompt differs (see [`prompt`]).

pub mod prompt;

use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use githerd_core::{OracleTool, PromptVia, ScanConfig};

/// An ordered fallback chain of external text-generation tools.
#[derive(Debug, Clone)]
pub struct TextOracle {
    tools: Vec<OracleTool>,
    timeout: Duration,
    max_output_bytes: usize,
}

impl TextOracle {
    pub fn new(tools: Vec<OracleTool>, timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            tools,
            timeout,
            max_output_bytes,
        }
    }

    /// The commit-message oracle for a scan configuration.
    pub fn for_commit_messages(config: &ScanConfig) -> Self {
        Self::new(
            config.commit_tools.clone(),
            config.oracle_timeout,
            config.oracle_max_output,
        )
    }

    /// The push-failure advice oracle for a scan configuration.
    pub fn for_advice(config: &ScanConfig) -> Self {
        Self::new(
            config.advice_tools.clone(),
            config.oracle_timeout,
            config.oracle_max_output,
        )
    }

    /// Ask each candidate tool in order; return the first line of the first
    /// non-empty response, or `None` when every candidate is unavailable or
    /// misbehaves. Never panics, never returns an error.
    pub fn ask(&self, prompt: &str) -> Option<String> {
        for tool in &self.tools {
            match self.invoke(tool, prompt) {
                Ok(Some(line)) => return Some(line),
                Ok(None) => {
                    log::debug!("oracle '{}' produced no usable output", tool.program);
                }
                Err(reason) => {
                    log::debug!("oracle '{}' unavailable: {reason}", tool.program);
                }
            }
        }
        None
    }

    fn invoke(&self, tool: &OracleTool, prompt: &str) -> Result<Option<String>, String> {
        let mut command = Command::new(&tool.program);
        command
            .args(&tool.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        match tool.prompt_via {
            PromptVia::Arg => {
                command.arg(prompt);
                command.stdin(Stdio::null());
            }
            PromptVia::Stdin => {
                command.stdin(Stdio::piped());
            }
        }

        // Spawn failure with NotFound doubles as the existence check.
        let mut child = command.spawn().map_err(|e| e.to_string())?;

        if tool.prompt_via == PromptVia::Stdin {
            if let Some(mut stdin) = child.stdin.take() {
                // A tool that closes stdin early is not an error here.
                let _ = stdin.write_all(prompt.as_bytes());
            }
        }

        let output = self.collect_bounded(&mut child)?;
        Ok(first_line(&output))
    }

    /// Read the child's stdout on a helper thread while polling for exit,
    /// capping captured bytes and killing the child on deadline.
    fn collect_bounded(&self, child: &mut Child) -> Result<String, String> {
        let stdout = child.stdout.take().ok_or("stdout not captured")?;
        let cap = self.max_output_bytes;
        let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
        let sink = Arc::clone(&buffer);

        let reader = thread::spawn(move || {
            let mut stdout = stdout;
            let mut chunk = [0u8; 4096];
            loop {
                match stdout.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        let mut buffer = match sink.lock() {
                            Ok(guard) => guard,
                            Err(_) => break,
                        };
                        let room = cap.saturating_sub(buffer.len());
                        buffer.extend_from_slice(&chunk[..n.min(room)]);
                        // Past the cap we keep draining so the child never
                        // blocks on a full pipe, but store nothing more.
                    }
                }
            }
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        let _ = reader.join();
                        return Err(format!("timed out after {:?}", self.timeout));
                    }
                    thread::sleep(Duration::from_millis(25));
                }
                Err(e) => return Err(e.to_string()),
            }
        };

        let _ = reader.join();
        if !status.success() {
            return Err(format!("exited with {status}"));
        }

        let bytes = buffer
            .lock()
            .map(|b| b.clone())
            .map_err(|_| "output buffer poisoned".to_string())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Oracles may emit explanatory text; only the first non-empty line is the
/// answer.
fn first_line(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
