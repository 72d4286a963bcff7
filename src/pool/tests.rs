use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc as StdArc;

#[test]
fn single_worker_degrades_gracefully() {
    let pool = WorkerPool::new(1);
    assert_eq!(pool.num_workers(), 1);
    let counter = StdArc::new(AtomicUsize::new(0));
    for _ in 0..5 {
        let counter = StdArc::clone(&counter);
        pool.schedule(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }
    pool.wait_till_all_free();
    assert_eq!(counter.load(Ordering::SeqCst), 5);
    pool.shutdown();
}

#[test]
fn zero_requested_workers_clamps_to_one() {
    let pool = WorkerPool::new(0);
    assert_eq!(pool.num_workers(), 1);
    pool.shutdown();
}

#[test]
fn all_scheduled_jobs_run_with_multiple_workers() {
    let pool = WorkerPool::new(4);
    let counter = StdArc::new(AtomicUsize::new(0));
    for _ in 0..200 {
        let counter = StdArc::clone(&counter);
        pool.schedule(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }
    pool.wait_till_all_free();
    assert_eq!(counter.load(Ordering::SeqCst), 200);
    pool.shutdown();
}

#[test]
fn dropping_without_explicit_shutdown_still_joins_workers() {
    let counter = StdArc::new(AtomicUsize::new(0));
    {
        let pool = WorkerPool::new(2);
        for _ in 0..10 {
            let counter = StdArc::clone(&counter);
            pool.schedule(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait_till_all_free();
    }
    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[test]
fn detect_cpu_count_is_at_least_one() {
    assert!(detect_cpu_count() >= 1);
}
