//! Termination signal handling
//!
//! Ctrl-C (and SIGTERM on unix) stops every worker before the process exits.

use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::worker::{StopReport, WorkerManager};

/// Spawn a task on `runtime` that waits for a termination signal, stops all
/// workers within `grace` and then calls `on_stopped`
pub fn spawn_signal_handler<F>(runtime: &Handle, workers: WorkerManager, grace: Duration, on_stopped: F)
where
    F: FnOnce(StopReport) + Send + 'static,
{
    runtime.spawn(async move {
        wait_for_signal().await;
        info!("Termination signal received - stopping workers");

        let stopped = tokio::task::spawn_blocking(move || workers.stop_all_within(grace)).await;
        match stopped {
            Ok(report) => {
                info!(
                    joined = report.joined,
                    panicked = report.panicked,
                    detached = report.detached,
                    "Workers stopped"
                );
                on_stopped(report);
            }
            Err(e) => {
                warn!("Worker shutdown task failed: {}", e);
                on_stopped(StopReport::default());
            }
        }
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to register SIGTERM handler: {}", e);
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
