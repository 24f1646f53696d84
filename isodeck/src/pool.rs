//! Bounded worker pool for blocking mount work.
//!
//! Mount attempts are slow, blocking OS calls, so they run on a fixed set of
//! OS threads fed from a FIFO queue. [`WorkerPool::submit`] accepts a closure
//! and returns a [`TaskHandle`] the caller can wait on; submissions are safe
//! while earlier tasks are still running.
//!
//! There is no work stealing and no priority ordering; the queue is strictly
//! first-in first-out.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Shared state between the pool handle and its workers.
struct PoolShared {
    queue: Mutex<PoolQueue>,
    available: Condvar,
}

struct PoolQueue {
    jobs: VecDeque<Job>,
    shutdown: bool,
}

/// Completion state behind a [`TaskHandle`].
struct TaskState {
    done: Mutex<bool>,
    finished: Condvar,
}

/// Handle to a submitted task.
///
/// Waiting is optional; a dropped handle does not cancel the task.
pub struct TaskHandle {
    state: Arc<TaskState>,
}

impl TaskHandle {
    /// Blocks until the task has run to completion.
    pub fn wait(&self) {
        let mut done = self.state.done.lock();
        while !*done {
            self.state.finished.wait(&mut done);
        }
    }

    /// Returns true if the task has completed.
    pub fn is_finished(&self) -> bool {
        *self.state.done.lock()
    }
}

/// A fixed-size pool of worker threads draining a FIFO job queue.
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Creates a pool with `workers` threads (minimum 1).
    pub fn new(workers: usize) -> Self {
        let shared = Arc::new(PoolShared {
            queue: Mutex::new(PoolQueue {
                jobs: VecDeque::new(),
                shutdown: false,
            }),
            available: Condvar::new(),
        });

        let workers = (0..workers.max(1))
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker_loop(shared))
            })
            .collect();

        Self { shared, workers }
    }

    /// Enqueues a closure for execution and returns its completion handle.
    pub fn submit<F>(&self, job: F) -> TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let state = Arc::new(TaskState {
            done: Mutex::new(false),
            finished: Condvar::new(),
        });
        let task_state = Arc::clone(&state);

        let wrapped: Job = Box::new(move || {
            job();
            let mut done = task_state.done.lock();
            *done = true;
            task_state.finished.notify_all();
        });

        {
            let mut queue = self.shared.queue.lock();
            queue.jobs.push_back(wrapped);
        }
        self.shared.available.notify_one();

        TaskHandle { state }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        {
            let mut queue = self.shared.queue.lock();
            queue.shutdown = true;
        }
        self.shared.available.notify_all();

        for worker in self.workers.drain(..) {
            worker.join().ok();
        }
    }
}

/// Worker thread body: pop jobs until shutdown is signalled and the queue
/// has drained.
fn worker_loop(shared: Arc<PoolShared>) {
    loop {
        let job = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(job) = queue.jobs.pop_front() {
                    break job;
                }
                if queue.shutdown {
                    return;
                }
                shared.available.wait(&mut queue);
            }
        };

        job();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_pool_runs_submitted_job() {
        let pool = WorkerPool::new(2);
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let handle = pool.submit(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        handle.wait();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
    }

    #[test]
    fn test_pool_runs_all_jobs() {
        let pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let counter = Arc::clone(&counter);
                pool.submit(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in &handles {
            handle.wait();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 32);
    }

    #[test]
    fn test_pool_bounds_concurrency() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                pool.submit(move || {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(20));
                    running.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in &handles {
            handle.wait();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_submit_while_running() {
        let pool = WorkerPool::new(1);
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        let slow = pool.submit(move || {
            thread::sleep(Duration::from_millis(30));
            c.fetch_add(1, Ordering::SeqCst);
        });

        // Enqueue behind the running task.
        let c = Arc::clone(&counter);
        let queued = pool.submit(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        slow.wait();
        queued.wait();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_workers_clamped_to_one() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.worker_count(), 1);

        let handle = pool.submit(|| {});
        handle.wait();
    }

    #[test]
    fn test_drop_drains_queue() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(1);
            for _ in 0..8 {
                let counter = Arc::clone(&counter);
                pool.submit(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
            // Dropping joins the workers after the queue drains.
        }
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }
}
