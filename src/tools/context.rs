//! Execution context handed to every capability

use std::time::Duration;

use chrono::{DateTime, Local};

use crate::command::sink::ResultSink;
use crate::core::config::WorkerConfig;
use crate::core::error::Result;
use crate::worker::{CancelFlag, WorkerId, WorkerManager};

/// Access to cancellation, background work and notices
///
/// Cloning is cheap; background work receives its own clone.
#[derive(Clone)]
pub struct ToolContext {
    workers: WorkerManager,
    notices: ResultSink,
    poll_interval: Duration,
    clock_poll: Duration,
}

impl ToolContext {
    pub fn new(workers: WorkerManager, notices: ResultSink, config: &WorkerConfig) -> Self {
        Self {
            workers,
            notices,
            poll_interval: config.poll_interval(),
            clock_poll: config.clock_poll(),
        }
    }

    /// Context wired to a private manager and a sink nobody reads
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        let (sink, _stream) = crate::command::sink::channel();
        Self::new(WorkerManager::new(), sink, &WorkerConfig::default())
    }

    pub fn workers(&self) -> &WorkerManager {
        &self.workers
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.workers.cancel_flag()
    }

    pub fn is_cancelled(&self) -> bool {
        self.workers.cancel_flag().is_cancelled()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Cooperative sleep; `false` means stop was requested
    pub fn sleep(&self, duration: Duration) -> bool {
        self.cancel_flag().sleep(duration, self.poll_interval)
    }

    /// Wait until the wall clock reaches `target`
    ///
    /// The clock is re-read every `clock_poll` so suspends and clock changes
    /// are picked up. Returns `false` if stop was requested first.
    pub fn wait_until(&self, target: DateTime<Local>) -> bool {
        loop {
            let now = Local::now();
            let Ok(remaining) = (target - now).to_std() else {
                return true;
            };
            if remaining.is_zero() {
                return true;
            }
            if !self.sleep(remaining.min(self.clock_poll)) {
                return false;
            }
        }
    }

    /// Post a notice to the result stream
    pub fn notify(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notices.notify(title, message);
    }

    /// Run `work` on its own tracked worker and return immediately
    pub fn spawn_background<F>(&self, label: &str, work: F) -> Result<WorkerId>
    where
        F: FnOnce(ToolContext) + Send + 'static,
    {
        let ctx = self.clone();
        self.workers.spawn(label, move |_| work(ctx))
    }
}
