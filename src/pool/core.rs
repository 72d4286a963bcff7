//! The fixed-size worker pool (§5 "Scheduling model"), external collaborator
//! per `spec.md` §1 but specified here since the walker depends on its
//! backpressure contract directly.
//!
//! Translates `original_source/src/threadpool.{h,cpp}`'s pthread
//! mutex/condvar producer-consumer design idiomatically: `freethreads`/
//! `TOMAIN`/`TOWORKER` become a `Mutex<State>` plus two `Condvar`s, and the
//! "push a null job per worker to request shutdown" trick becomes an
//! `Option<Job>` sentinel, exactly as the original does it, not a channel
//! (a bounded `std::sync::mpsc` would hide the explicit
//! `free_count == 0` backpressure §5 calls out by name).

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// `None` is the shutdown sentinel (§5: "a sentinel (empty work item) is
/// enqueued once per worker at shutdown; workers observing it exit").
type QueueItem = Option<Job>;

struct State {
    queue: VecDeque<QueueItem>,
    free_threads: usize,
}

/// Shared pool state plus the two condition variables guarding the work
/// queue: `to_main` wakes the producer when a worker frees up
/// (`free_count == 0`), `to_worker` wakes a worker when `queue` is
/// non-empty (§5 "Suspension points").
struct Shared {
    state: Mutex<State>,
    to_main: Condvar,
    to_worker: Condvar,
}

/// A fixed-size pool of worker threads draining a bounded work queue.
/// `size == 1` degrades gracefully to single-threaded (the producer simply
/// always waits for the one worker, per §5).
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` worker threads (minimum 1).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                free_threads: size,
            }),
            to_main: Condvar::new(),
            to_worker: Condvar::new(),
        });

        let workers = (0..size)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || worker_loop(shared))
            })
            .collect();

        WorkerPool { shared, workers }
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Enqueues `job`, blocking the caller while `free_threads == 0` (§5:
    /// the walker thread is the sole producer and this is its only
    /// blocking suspension point besides file/output I/O).
    pub fn schedule(&self, job: impl FnOnce() + Send + 'static) {
        let mut state = self.shared.state.lock().unwrap();
        while state.free_threads == 0 {
            state = self.shared.to_main.wait(state).unwrap();
        }
        state.queue.push_back(Some(Box::new(job)));
        state.free_threads -= 1;
        self.shared.to_worker.notify_one();
    }

    /// Blocks until every worker has returned to the free pool (all
    /// scheduled work has completed). Does not shut down the pool.
    pub fn wait_till_all_free(&self) {
        let mut state = self.shared.state.lock().unwrap();
        while state.free_threads != self.workers.len() {
            state = self.shared.to_main.wait(state).unwrap();
        }
    }

    /// Enqueues one shutdown sentinel per worker and joins every thread.
    /// Cooperative only: an in-flight job is never preempted (§5
    /// "Cancellation").
    pub fn shutdown(mut self) {
        self.send_sentinels();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }

    fn send_sentinels(&self) {
        let mut state = self.shared.state.lock().unwrap();
        for _ in 0..self.workers.len() {
            state.queue.push_back(None);
        }
        self.shared.to_worker.notify_all();
    }
}

impl Drop for WorkerPool {
    /// A pool dropped without an explicit `shutdown()` still requests every
    /// worker to exit, so a panic elsewhere in the walker doesn't leak
    /// threads blocked forever on an empty queue.
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.send_sentinels();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let item = {
            let mut state = shared.state.lock().unwrap();
            while state.queue.is_empty() {
                state = shared.to_worker.wait(state).unwrap();
            }
            state.queue.pop_front().unwrap()
        };

        let Some(job) = item else {
            break;
        };
        job();

        let mut state = shared.state.lock().unwrap();
        state.free_threads += 1;
        shared.to_main.notify_one();
        drop(state);
    }
}

/// Detected CPU count, defaulting to 1 on a query failure (§5: "1 degrades
/// gracefully to single-threaded").
pub fn detect_cpu_count() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
