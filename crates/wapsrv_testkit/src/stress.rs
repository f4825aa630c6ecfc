//! Stress tests for wapsrv.
//!
//! These helpers drive an engine from several threads at once and count
//! outcomes so tests can check the store stayed consistent.

use crate::fixtures::{annotation_body, container_body};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use wapsrv_core::{ContainerPreferences, WapEngine};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {name} ===");
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 50,
            threads: 4,
        }
    }
}

/// Posts annotations into `container_iri` from several threads.
pub fn stress_concurrent_posts(
    engine: &Arc<WapEngine>,
    container_iri: &str,
    config: &StressConfig,
) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let engine = Arc::clone(engine);
            let container = container_iri.to_string();
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let operations = config.operations;

            thread::spawn(move || {
                for i in 0..operations {
                    let target = format!("http://example.org/thread/{t}/{i}");
                    let posted = engine
                        .annotations()
                        .post_annotation(&container, annotation_body(&target));
                    match posted {
                        Ok(_) => successful.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Interleaves container creation, reads and deletion from several threads.
///
/// Each thread works under its own slug prefix, so every operation is
/// expected to succeed.
pub fn stress_mixed_operations(engine: &Arc<WapEngine>, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let engine = Arc::clone(engine);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let operations = config.operations;

            thread::spawn(move || {
                let count = |ok: bool| {
                    if ok {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                };
                for i in 0..operations {
                    let slug = format!("t{t}-c{i}");
                    let created = engine.containers().post_container(
                        engine.root_iri(),
                        Some(&slug),
                        container_body(None),
                    );
                    let Ok(view) = created else {
                        count(false);
                        continue;
                    };
                    count(true);

                    count(
                        engine
                            .annotations()
                            .post_annotation(&view.iri, annotation_body("http://example.org/doc"))
                            .is_ok(),
                    );

                    let minimal = ContainerPreferences::new().minimal_container(true);
                    let fresh = engine.containers().get_container(&view.iri, minimal);
                    count(fresh.is_ok());

                    if i % 2 == 0 {
                        let etag = fresh.ok().and_then(|v| v.etag).unwrap_or_default();
                        count(engine.containers().delete_container(&view.iri, &etag).is_ok());
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}
