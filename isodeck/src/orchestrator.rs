//! Concurrent mount orchestration.
//!
//! The orchestrator turns an operator selection into bounded concurrent
//! mount tasks and aggregates their outcomes:
//!
//! ```text
//! selection string ──► RangeSelector ──► index set
//!                                          │
//!                                          ▼
//!                  WorkerPool ◄── one task per resolved index
//!                      │
//!                      ▼
//!                  MountEngine (per image) ──► OutcomeLog
//!                      │
//!    ProgressReporter ◄┘ (atomic completed/total)
//! ```
//!
//! Ordering across candidates is unspecified; the guarantees are
//! completeness, absence of duplicates, and that the batch always runs to
//! the end regardless of individual failures.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

use crate::mount::{MountBackend, MountEngine, OutcomeLog, OutcomeReport};
use crate::pool::WorkerPool;
use crate::progress::{ProgressCallback, ProgressCounters, ProgressReporter, DEFAULT_POLL_INTERVAL};
use crate::selection::{parse_selection, sizing_token_count};

/// Selection sentinel meaning "every candidate".
pub const ALL_SENTINEL: &str = "00";

/// Tuning knobs for one orchestrator instance.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Ceiling on concurrent mount workers.
    pub max_concurrency: usize,

    /// Poll interval for the progress reporter.
    pub poll_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_concurrency(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Hardware thread count, falling back to 4 when it cannot be queried.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Completion accounting for one orchestration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Tasks submitted to the pool.
    pub submitted: usize,

    /// Tasks observed complete before return.
    pub completed: usize,
}

impl BatchSummary {
    fn empty() -> Self {
        Self {
            submitted: 0,
            completed: 0,
        }
    }
}

/// Composes selection parsing, the worker pool, the mount engine, and
/// progress reporting; owns the shared outcome sets.
pub struct MountOrchestrator<B: MountBackend + 'static> {
    engine: Arc<MountEngine<B>>,
    outcomes: Arc<OutcomeLog>,
    config: OrchestratorConfig,
}

impl<B: MountBackend + 'static> MountOrchestrator<B> {
    /// Creates an orchestrator around `engine`.
    pub fn new(engine: MountEngine<B>, config: OrchestratorConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            outcomes: Arc::new(OutcomeLog::new()),
            config,
        }
    }

    /// The shared outcome log.
    pub fn outcomes(&self) -> &Arc<OutcomeLog> {
        &self.outcomes
    }

    /// Drains the outcome sets for display.
    pub fn take_report(&self) -> OutcomeReport {
        self.outcomes.take()
    }

    /// Runs one orchestration call: `00` mounts every candidate, anything
    /// else is parsed as an index/range selection.
    pub fn run(
        &self,
        candidates: &[PathBuf],
        input: &str,
        on_progress: Option<ProgressCallback>,
    ) -> BatchSummary {
        if input.trim() == ALL_SENTINEL {
            self.mount_all(candidates, on_progress)
        } else {
            self.mount_selection(candidates, input, on_progress)
        }
    }

    /// Mounts every candidate.
    pub fn mount_all(
        &self,
        candidates: &[PathBuf],
        on_progress: Option<ProgressCallback>,
    ) -> BatchSummary {
        if candidates.is_empty() {
            return BatchSummary::empty();
        }

        let workers = candidates.len().min(self.config.max_concurrency);
        info!(
            total = candidates.len(),
            workers, "mounting all candidates"
        );

        let counters = Arc::new(ProgressCounters::new(candidates.len()));
        let reporter = on_progress.map(|cb| {
            ProgressReporter::start(
                Arc::clone(&counters),
                Arc::new(cb),
                self.config.poll_interval,
            )
        });

        let pool = WorkerPool::new(workers);
        let handles: Vec<_> = candidates
            .iter()
            .cloned()
            .map(|path| {
                let engine = Arc::clone(&self.engine);
                let outcomes = Arc::clone(&self.outcomes);
                let counters = Arc::clone(&counters);
                pool.submit(move || {
                    let attempt = engine.mount_image(&path);
                    outcomes.record(attempt.disposition.clone(), attempt.display_line());
                    counters.task_done();
                })
            })
            .collect();

        for handle in &handles {
            handle.wait();
        }

        counters.signal_done();
        if let Some(reporter) = reporter {
            reporter.stop();
        }

        BatchSummary {
            submitted: candidates.len(),
            completed: counters.completed(),
        }
    }

    /// Resolves `input` against `candidates` and mounts the selected
    /// subset. Parse errors land in the InputError set without affecting
    /// mount outcomes.
    pub fn mount_selection(
        &self,
        candidates: &[PathBuf],
        input: &str,
        on_progress: Option<ProgressCallback>,
    ) -> BatchSummary {
        let selection = parse_selection(input, candidates.len());
        for error in &selection.errors {
            self.outcomes.record_input_error(error.clone());
        }

        if selection.is_empty() {
            debug!("selection resolved no indices, nothing submitted");
            return BatchSummary::empty();
        }

        // The accounting pass sizes the pool; it caps the count of distinct
        // indices it will consider, not the number of tasks submitted below.
        let sized = sizing_token_count(input, candidates.len(), self.config.max_concurrency);
        let workers = sized.max(1).min(self.config.max_concurrency);

        let total = selection.indices.len();
        info!(total, workers, "mounting selection");

        let counters = Arc::new(ProgressCounters::new(total));
        let reporter = on_progress.map(|cb| {
            ProgressReporter::start(
                Arc::clone(&counters),
                Arc::new(cb),
                self.config.poll_interval,
            )
        });

        let active = Arc::new((Mutex::new(total), Condvar::new()));
        let pool = WorkerPool::new(workers);

        for index in selection.indices.iter().copied() {
            let path = candidates[index - 1].clone();
            let engine = Arc::clone(&self.engine);
            let outcomes = Arc::clone(&self.outcomes);
            let counters = Arc::clone(&counters);
            let active = Arc::clone(&active);

            pool.submit(move || {
                // Second line of defense behind the parser's dedup: an
                // index is processed at most once per orchestration call.
                if outcomes.claim(index) {
                    let attempt = engine.mount_image(&path);
                    outcomes.record(attempt.disposition.clone(), attempt.display_line());
                }

                counters.task_done();
                let (count, finished) = &*active;
                let mut remaining = count.lock();
                *remaining -= 1;
                if *remaining == 0 {
                    finished.notify_all();
                }
            });
        }

        // Block until the active-task count reaches zero.
        {
            let (count, finished) = &*active;
            let mut remaining = count.lock();
            while *remaining > 0 {
                finished.wait(&mut remaining);
            }
        }

        counters.signal_done();
        if let Some(reporter) = reporter {
            reporter.stop();
        }

        BatchSummary {
            submitted: total,
            completed: counters.completed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that mounts everything on the first type and counts calls.
    struct CountingBackend {
        calls: AtomicUsize,
    }

    impl CountingBackend {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl MountBackend for CountingBackend {
        fn is_mount_point(&self, _path: &Path) -> bool {
            false
        }

        fn is_privileged(&self) -> bool {
            true
        }

        fn load_module(&self, _module: &str) -> io::Result<()> {
            Ok(())
        }

        fn mount_readonly(&self, _source: &Path, _target: &Path, _fstype: &str) -> io::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn orchestrator_in_tempdir() -> (MountOrchestrator<CountingBackend>, tempfile::TempDir) {
        let root = tempfile::tempdir().unwrap();
        let engine = MountEngine::new(CountingBackend::new()).with_mount_root(root.path());
        let orchestrator = MountOrchestrator::new(engine, OrchestratorConfig::default());
        (orchestrator, root)
    }

    fn candidates(n: usize) -> Vec<PathBuf> {
        (1..=n)
            .map(|i| PathBuf::from(format!("/library/disc{}.iso", i)))
            .collect()
    }

    #[test]
    fn test_overlapping_ranges_mount_each_index_once() {
        let (orchestrator, _root) = orchestrator_in_tempdir();
        let summary = orchestrator.run(&candidates(6), "1-3 2-5", None);

        assert_eq!(summary.submitted, 5);
        assert_eq!(summary.completed, 5);

        let report = orchestrator.take_report();
        assert_eq!(report.mounted.len(), 5);
        assert!(report.input_errors.is_empty());
    }

    #[test]
    fn test_out_of_range_selection_submits_nothing() {
        let (orchestrator, _root) = orchestrator_in_tempdir();
        let summary = orchestrator.run(&candidates(5), "7", None);

        assert_eq!(summary.submitted, 0);
        let report = orchestrator.take_report();
        assert!(report.input_errors.contains("invalid index '7'"));
        assert!(report.mounted.is_empty());
    }

    #[test]
    fn test_all_sentinel_mounts_everything() {
        let (orchestrator, _root) = orchestrator_in_tempdir();
        let summary = orchestrator.run(&candidates(5), "00", None);

        assert_eq!(summary.submitted, 5);
        assert_eq!(summary.completed, 5);
        assert_eq!(orchestrator.take_report().mounted.len(), 5);
    }

    #[test]
    fn test_empty_candidate_list_with_all_sentinel() {
        let (orchestrator, _root) = orchestrator_in_tempdir();
        let summary = orchestrator.run(&[], "00", None);
        assert_eq!(summary, BatchSummary::empty());
    }

    #[test]
    fn test_errors_and_mounts_coexist() {
        let (orchestrator, _root) = orchestrator_in_tempdir();
        orchestrator.run(&candidates(4), "1 9 abc", None);

        let report = orchestrator.take_report();
        assert_eq!(report.mounted.len(), 1);
        assert!(report.input_errors.contains("invalid index '9'"));
        assert!(report.input_errors.contains("invalid input 'abc'"));
    }

    #[test]
    fn test_progress_callback_observes_completion() {
        let (orchestrator, _root) = orchestrator_in_tempdir();

        let final_state = Arc::new(Mutex::new((0usize, 0usize)));
        let state = Arc::clone(&final_state);
        let callback: ProgressCallback = Box::new(move |completed, total| {
            *state.lock() = (completed, total);
        });

        let summary = orchestrator.run(&candidates(3), "1-3", Some(callback));
        assert_eq!(summary.completed, 3);

        // Final render saw every task complete.
        assert_eq!(*final_state.lock(), (3, 3));
    }

    #[test]
    fn test_sequential_calls_reuse_log() {
        let (orchestrator, _root) = orchestrator_in_tempdir();

        orchestrator.run(&candidates(3), "1", None);
        let first = orchestrator.take_report();
        assert_eq!(first.mounted.len(), 1);

        orchestrator.run(&candidates(3), "2", None);
        let second = orchestrator.take_report();
        assert_eq!(second.mounted.len(), 1);
    }
}
