//! Process-wide cooperative cancellation flag

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared stop signal checked by long-running work
///
/// Cancellation is advisory: work must poll `is_cancelled` (or use
/// [`CancelFlag::sleep`]) at each iteration boundary and return on its own.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub(crate) fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }

    /// Sleep for `duration` in slices of at most `poll`
    ///
    /// Returns `true` when the full duration elapsed and `false` as soon as
    /// cancellation is observed. A duration too large for the clock never
    /// elapses and only ends on cancellation.
    pub fn sleep(&self, duration: Duration, poll: Duration) -> bool {
        let poll = poll.max(Duration::from_millis(1));
        let deadline = Instant::now().checked_add(duration);
        loop {
            if self.is_cancelled() {
                return false;
            }
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return true;
                    }
                    poll.min(deadline - now)
                }
                None => poll,
            };
            std::thread::sleep(slice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_completes_when_not_cancelled() {
        let flag = CancelFlag::new();
        let started = Instant::now();
        assert!(flag.sleep(Duration::from_millis(30), Duration::from_millis(5)));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_sleep_returns_early_on_cancel() {
        let flag = CancelFlag::new();
        let remote = flag.clone();
        let waker = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let started = Instant::now();
        assert!(!flag.sleep(Duration::from_secs(10), Duration::from_millis(5)));
        assert!(started.elapsed() < Duration::from_secs(5));
        waker.join().unwrap();
    }

    #[test]
    fn test_unrepresentable_duration_waits_for_cancel() {
        let flag = CancelFlag::new();
        let remote = flag.clone();
        let waker = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        assert!(!flag.sleep(Duration::MAX, Duration::from_millis(5)));
        waker.join().unwrap();
    }

    #[test]
    fn test_reset_clears_flag_for_all_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        flag.cancel();
        assert!(clone.is_cancelled());
        flag.reset();
        assert!(!clone.is_cancelled());
    }
}
