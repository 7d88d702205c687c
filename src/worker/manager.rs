//! Owner of every running invocation thread
//!
//! Each dispatched invocation (and any background work a tool starts) runs
//! on its own named OS thread. The manager keeps the join handles, shares a
//! single cancellation flag with all of them, and provides the one barrier in
//! the system: `stop_all`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::core::error::{DeskError, Result};
use crate::worker::cancel::CancelFlag;

/// How often `stop_all_within` re-checks a worker that has not finished yet
const STOP_POLL: Duration = Duration::from_millis(10);

/// Identifier handed back to callers of `spawn`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId(pub u64);

/// One tracked thread, owned by the manager
struct WorkerHandle {
    id: WorkerId,
    label: String,
    thread: JoinHandle<()>,
}

/// Summary of a stop-all pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopReport {
    /// Workers that exited and were joined
    pub joined: usize,
    /// Workers whose thread ended in a panic
    pub panicked: usize,
    /// Workers still running at the deadline, left detached
    pub detached: usize,
}

impl StopReport {
    pub fn is_clean(&self) -> bool {
        self.panicked == 0 && self.detached == 0
    }
}

struct Inner {
    handles: Mutex<Vec<WorkerHandle>>,
    cancel: CancelFlag,
    /// Number of stop passes in progress; the flag is reset only by the last
    stopping: Mutex<usize>,
    next_id: AtomicU64,
}

/// Cloneable handle to the shared worker set
#[derive(Clone)]
pub struct WorkerManager {
    inner: Arc<Inner>,
}

impl Default for WorkerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                handles: Mutex::new(Vec::new()),
                cancel: CancelFlag::new(),
                stopping: Mutex::new(0),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// The flag shared by every worker of this manager
    pub fn cancel_flag(&self) -> CancelFlag {
        self.inner.cancel.clone()
    }

    /// Start `work` on a new thread and track it until it finishes
    ///
    /// Never waits for `work`. The handle is registered under the same lock
    /// that `stop_all` takes, so a worker is either seen by a concurrent stop
    /// or spawned after it.
    pub fn spawn<F>(&self, label: impl Into<String>, work: F) -> Result<WorkerId>
    where
        F: FnOnce(CancelFlag) + Send + 'static,
    {
        let label = label.into();
        let id = WorkerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let cancel = self.inner.cancel.clone();

        let mut handles = self.lock();
        reap_finished(&mut handles);

        let thread = thread::Builder::new()
            .name(format!("worker-{}-{}", id.0, label))
            .spawn(move || work(cancel))
            .map_err(|source| DeskError::Spawn {
                label: label.clone(),
                source,
            })?;

        debug!(worker = id.0, label = %label, active = handles.len() + 1, "Worker spawned");
        handles.push(WorkerHandle { id, label, thread });
        Ok(id)
    }

    /// Number of workers that have not finished yet
    pub fn active_count(&self) -> usize {
        let mut handles = self.lock();
        reap_finished(&mut handles);
        handles.len()
    }

    /// Cancel everything, join every worker, then reset for reuse
    ///
    /// Blocks until all tracked workers have returned, including workers
    /// spawned by other workers while the stop is in progress. A worker that
    /// never checks the cancellation flag blocks this call. Stops may
    /// overlap; the flag is reset only when the last one returns.
    pub fn stop_all(&self) -> StopReport {
        self.stop(None)
    }

    /// Like `stop_all`, but gives workers at most `grace` to exit
    ///
    /// Workers still running at the deadline are detached, not killed, and
    /// counted in `StopReport::detached`.
    pub fn stop_all_within(&self, grace: Duration) -> StopReport {
        self.stop(Some(Instant::now() + grace))
    }

    fn stop(&self, deadline: Option<Instant>) -> StopReport {
        {
            let mut stopping = lock_ignoring_poison(&self.inner.stopping);
            *stopping += 1;
            self.inner.cancel.cancel();
        }
        info!("Stopping all workers");

        let mut report = StopReport::default();
        loop {
            let batch = std::mem::take(&mut *self.lock());
            if batch.is_empty() {
                break;
            }
            for handle in batch {
                let finished = match deadline {
                    None => true,
                    Some(deadline) => wait_until_finished(&handle.thread, deadline),
                };
                if finished {
                    join(handle, &mut report);
                } else {
                    warn!(
                        worker = handle.id.0,
                        label = %handle.label,
                        "Worker ignored cancellation, detaching"
                    );
                    report.detached += 1;
                }
            }
        }

        {
            let mut stopping = lock_ignoring_poison(&self.inner.stopping);
            *stopping -= 1;
            if *stopping == 0 {
                self.inner.cancel.reset();
            } else {
                debug!(remaining = *stopping, "Another stop is still draining, flag left set");
            }
        }
        info!(
            joined = report.joined,
            panicked = report.panicked,
            detached = report.detached,
            "All workers stopped"
        );
        report
    }

    fn lock(&self) -> MutexGuard<'_, Vec<WorkerHandle>> {
        lock_ignoring_poison(&self.inner.handles)
    }
}

// Both guarded values (join handles, a counter) stay consistent even if a
// holder panicked.
fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn reap_finished(handles: &mut Vec<WorkerHandle>) {
    let mut index = 0;
    while index < handles.len() {
        if handles[index].thread.is_finished() {
            let handle = handles.swap_remove(index);
            if handle.thread.join().is_err() {
                warn!(worker = handle.id.0, label = %handle.label, "Worker panicked");
            }
        } else {
            index += 1;
        }
    }
}

fn wait_until_finished(thread: &JoinHandle<()>, deadline: Instant) -> bool {
    while !thread.is_finished() {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(STOP_POLL);
    }
    true
}

fn join(handle: WorkerHandle, report: &mut StopReport) {
    match handle.thread.join() {
        Ok(()) => report.joined += 1,
        Err(_) => {
            warn!(worker = handle.id.0, label = %handle.label, "Worker panicked");
            report.panicked += 1;
        }
    }
}
