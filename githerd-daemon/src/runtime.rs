use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc, oneshot};

use githerd_core::{RunSummary, ScanConfig};
use githerd_sync::{pipeline, report};

use crate::error::DaemonError;

/// Why the runtime stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAction {
    /// `q` or ctrl-c: stop the timer and exit 0.
    Quit,
    /// `R`: the caller should re-exec the process image.
    Restart,
}

struct ScanJob {
    source: &'static str,
    /// Present for triggers that wait on the result (startup, keyboard);
    /// absent for fire-and-forget periodic ticks.
    respond_to: Option<oneshot::Sender<Result<RunSummary, String>>>,
}

/// Parsed interactive command. One non-empty line each.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Rescan,
    Restart,
    Quit,
    Noop,
    Unrecognized(String),
}

fn parse_command(line: &str) -> Command {
    match line.trim() {
        "" => Command::Noop,
        "r" => Command::Rescan,
        "R" => Command::Restart,
        "q" => Command::Quit,
        other => Command::Unrecognized(other.to_string()),
    }
}

/// Start the daemon runtime and block the current thread until it exits.
pub fn start_blocking(config: ScanConfig) -> Result<ExitAction, DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| DaemonError::Runtime(format!("tokio runtime: {e}")))?;
    runtime.block_on(run(config))
}

/// Run the daemon runtime: initial scan, then periodic + keyboard triggers
/// until quit/restart.
pub async fn run(config: ScanConfig) -> Result<ExitAction, DaemonError> {
    // Capacity 1 is the concurrency discipline: at most one cycle runs and
    // at most one trigger waits; anything beyond is dropped.
    let (scan_tx, scan_rx) = mpsc::channel::<ScanJob>(1);
    let (shutdown_tx, _) = broadcast::channel::<()>(16);
    let restart_requested = Arc::new(AtomicBool::new(false));

    let processor_handle = {
        let shutdown = shutdown_tx.clone();
        let config = config.clone();
        tokio::spawn(async move {
            let result = scan_processor_task(config, scan_rx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    // One scan immediately on startup, before any trigger can fire.
    match enqueue_and_wait(&scan_tx, "startup").await {
        Ok(summary) => {
            tracing::info!(
                "startup scan: {} repositories, {} failures",
                summary.scanned,
                summary.failures.len()
            );
        }
        Err(err) => tracing::error!("startup scan failed: {err}"),
    }

    let timer_handle = {
        let shutdown = shutdown_tx.clone();
        let scan_tx = scan_tx.clone();
        let interval = config.interval;
        tokio::spawn(async move { timer_task(interval, scan_tx, shutdown.subscribe()).await })
    };

    let stdin_handle = {
        let shutdown = shutdown_tx.clone();
        let scan_tx = scan_tx.clone();
        let restart = restart_requested.clone();
        tokio::spawn(async move {
            let result = stdin_task(scan_tx, restart, shutdown.clone(), shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Runtime(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    // Dropping our sender lets the processor drain and stop once every task
    // holding a clone has exited.
    drop(scan_tx);

    let (processor_result, timer_result, stdin_result, signal_result) =
        tokio::join!(processor_handle, timer_handle, stdin_handle, signal_handle);

    handle_join("scan_processor", processor_result)?;
    handle_join("timer", timer_result)?;
    handle_join("stdin", stdin_result)?;
    handle_join("signal_handler", signal_result)?;

    Ok(if restart_requested.load(Ordering::SeqCst) {
        ExitAction::Restart
    } else {
        ExitAction::Quit
    })
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// The single consumer of scan jobs. Cycles run via `spawn_blocking` since
/// all git work is blocking subprocess I/O; an in-flight cycle finishes even
/// during shutdown (an interrupted commit risks a broken index).
async fn scan_processor_task(
    config: ScanConfig,
    mut scan_rx: mpsc::Receiver<ScanJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            maybe_job = scan_rx.recv() => {
                let Some(job) = maybe_job else { break };
                tracing::info!("scan cycle starting (trigger: {})", job.source);

                let cycle_config = config.clone();
                let outcome = tokio::task::spawn_blocking(move || pipeline::run(&cycle_config))
                    .await
                    .map_err(|err| DaemonError::Runtime(format!("scan task join error: {err}")))?;

                let outcome = match outcome {
                    Ok(summary) => {
                        print!("{}", report::render_summary(&summary));
                        Ok(summary)
                    }
                    Err(err) => {
                        tracing::error!("scan cycle failed: {err}");
                        Err(err.to_string())
                    }
                };

                if let Some(respond_to) = job.respond_to {
                    let _ = respond_to.send(outcome);
                }
            }
        }
    }
    Ok(())
}

/// Periodic trigger. A tick that lands while a cycle is running (queue full)
/// is dropped, never run concurrently.
async fn timer_task(
    interval: std::time::Duration,
    scan_tx: mpsc::Sender<ScanJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    ticker.tick().await; // consume the immediate first tick; startup already scanned

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = ticker.tick() => {
                let job = ScanJob { source: "timer", respond_to: None };
                if let Err(mpsc::error::TrySendError::Full(_)) = scan_tx.try_send(job) {
                    tracing::debug!("scan already in flight; dropping periodic trigger");
                }
            }
        }
    }
    Ok(())
}

/// Interactive loop: single-character commands on stdin.
async fn stdin_task(
    scan_tx: mpsc::Sender<ScanJob>,
    restart_requested: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                match parse_command(&line) {
                    Command::Noop => {}
                    Command::Rescan => match enqueue_and_wait(&scan_tx, "keyboard").await {
                        Ok(_) => {}
                        Err(err) => tracing::error!("manual scan failed: {err}"),
                    },
                    Command::Restart => {
                        restart_requested.store(true, Ordering::SeqCst);
                        let _ = shutdown_tx.send(());
                        break;
                    }
                    Command::Quit => {
                        let _ = shutdown_tx.send(());
                        break;
                    }
                    Command::Unrecognized(text) => {
                        println!("unrecognized command '{text}' (r = rescan, R = restart, q = quit)");
                    }
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn enqueue_and_wait(
    scan_tx: &mpsc::Sender<ScanJob>,
    source: &'static str,
) -> Result<RunSummary, DaemonError> {
    let (tx, rx) = oneshot::channel();
    scan_tx
        .send(ScanJob {
            source,
            respond_to: Some(tx),
        })
        .await
        .map_err(|_| DaemonError::ChannelClosed("scan queue"))?;

    let outcome = rx
        .await
        .map_err(|_| DaemonError::ChannelClosed("scan response"))?;
    outcome.map_err(DaemonError::Runtime)
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Runtime(format!("{task} task join failure: {err}"))),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
