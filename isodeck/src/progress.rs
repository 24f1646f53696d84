//! Live progress reporting for mount batches.
//!
//! Workers bump an atomic completed counter as tasks finish; a dedicated
//! reporter thread polls the counters and invokes a rendering callback until
//! the orchestrator signals completion. The callback owns presentation:
//! the CLI plugs in a progress bar, tests plug in counters.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Rendering callback invoked on every poll tick.
///
/// # Arguments
///
/// * `completed` - Tasks finished so far
/// * `total` - Total tasks submitted for this batch
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Default interval between reporter polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shared task counters for one orchestration batch.
#[derive(Debug)]
pub struct ProgressCounters {
    completed: AtomicUsize,
    total: usize,
    done: AtomicBool,
}

impl ProgressCounters {
    /// Create counters for a batch of `total` tasks.
    pub fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
            done: AtomicBool::new(false),
        }
    }

    /// Record one completed task.
    pub fn task_done(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    /// Tasks completed so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Total tasks in the batch.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Signal the reporter thread to finish.
    pub fn signal_done(&self) {
        self.done.store(true, Ordering::SeqCst);
    }

    /// Check whether completion has been signalled.
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }
}

/// Background reporter rendering `completed/total` until signalled done.
///
/// Started before tasks are submitted and joined once the orchestrator has
/// observed all tasks complete. Dropping the reporter signals done and joins
/// the thread.
pub struct ProgressReporter {
    handle: Option<JoinHandle<()>>,
    counters: Arc<ProgressCounters>,
}

impl ProgressReporter {
    /// Start a reporter polling at `poll_interval`.
    pub fn start(
        counters: Arc<ProgressCounters>,
        callback: Arc<ProgressCallback>,
        poll_interval: Duration,
    ) -> Self {
        let counters_clone = Arc::clone(&counters);

        let handle = thread::spawn(move || {
            while !counters_clone.is_done() {
                callback(counters_clone.completed(), counters_clone.total());
                thread::sleep(poll_interval);
            }

            // Final render so the display lands on the end state.
            callback(counters_clone.completed(), counters_clone.total());
        });

        Self {
            handle: Some(handle),
            counters,
        }
    }

    /// Start a reporter with the default poll interval.
    pub fn start_default(counters: Arc<ProgressCounters>, callback: Arc<ProgressCallback>) -> Self {
        Self::start(counters, callback, DEFAULT_POLL_INTERVAL)
    }

    /// Signal completion and wait for the reporter thread to exit.
    pub fn stop(mut self) {
        self.counters.signal_done();
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.counters.signal_done();
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let counters = ProgressCounters::new(4);
        assert_eq!(counters.completed(), 0);
        assert_eq!(counters.total(), 4);
        assert!(!counters.is_done());
    }

    #[test]
    fn test_task_done_increments() {
        let counters = ProgressCounters::new(3);
        counters.task_done();
        counters.task_done();
        assert_eq!(counters.completed(), 2);
    }

    #[test]
    fn test_signal_done() {
        let counters = ProgressCounters::new(1);
        assert!(!counters.is_done());
        counters.signal_done();
        assert!(counters.is_done());
    }

    #[test]
    fn test_reporter_invokes_callback_until_stopped() {
        let counters = Arc::new(ProgressCounters::new(2));
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = Arc::clone(&calls);
        let callback: ProgressCallback = Box::new(move |_completed, _total| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        let reporter = ProgressReporter::start(
            Arc::clone(&counters),
            Arc::new(callback),
            Duration::from_millis(5),
        );

        thread::sleep(Duration::from_millis(30));
        reporter.stop();

        assert!(calls.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_reporter_final_render_sees_end_state() {
        let counters = Arc::new(ProgressCounters::new(2));
        let last_seen = Arc::new(AtomicUsize::new(usize::MAX));

        let last_clone = Arc::clone(&last_seen);
        let callback: ProgressCallback = Box::new(move |completed, _total| {
            last_clone.store(completed, Ordering::SeqCst);
        });

        let reporter = ProgressReporter::start(
            Arc::clone(&counters),
            Arc::new(callback),
            Duration::from_millis(5),
        );

        counters.task_done();
        counters.task_done();
        reporter.stop();

        // The post-done render must have observed both completions.
        assert_eq!(last_seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_drop_terminates_reporter_thread() {
        let counters = Arc::new(ProgressCounters::new(1));
        let callback: ProgressCallback = Box::new(|_, _| {});

        let reporter = ProgressReporter::start(
            Arc::clone(&counters),
            Arc::new(callback),
            Duration::from_millis(5),
        );

        drop(reporter);
        assert!(counters.is_done());
    }
}
