//! Paired lock/unlock load on a single semaphore

use std::thread;
use std::time::Instant;

use ksync_manager::{LockFlags, Manager, SemHandle};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct StressReport {
    pub handle: SemHandle,
    pub workers: usize,
    pub iterations: usize,
    pub initial_count: u32,
    pub final_count: i64,
    pub token_count: u64,
    pub failed_locks: usize,
    pub balanced: bool,
    pub elapsed_ms: u128,
}

impl StressReport {
    pub fn print(&self) {
        println!(
            "Semaphore {}: {} workers x {} iterations in {} ms",
            self.handle, self.workers, self.iterations, self.elapsed_ms
        );
        println!(
            "Count = {} (initial {}), tokens = {}, failed locks = {}",
            self.final_count, self.initial_count, self.token_count, self.failed_locks
        );
        println!("{}", if self.balanced { "balanced" } else { "UNBALANCED" });
    }
}

/// Run `workers` threads, each doing `iterations` lock/unlock pairs with
/// the manager's default timeout. A lock that times out is not unlocked.
///
/// # Errors
///
/// Returns an error for an initial count of zero (no worker could ever
/// get in), if a worker panics, or if the semaphore disappears.
pub fn run(
    manager: &Manager,
    workers: usize,
    iterations: usize,
    initial_count: u32,
) -> Result<StressReport, CliError> {
    if initial_count == 0 {
        return Err(CliError::InvalidArguments(
            "stress needs an initial count of at least 1".to_string(),
        ));
    }
    let handle = manager.create_semaphore(initial_count);
    let timeout = manager.default_timeout();
    info!(%handle, workers, iterations, %timeout, "stress run starting");

    let started = Instant::now();
    let failed_locks = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                scope.spawn(move || {
                    let mut failed = 0;
                    for _ in 0..iterations {
                        match manager.lock_semaphore(handle, LockFlags::NONE, timeout) {
                            Ok(()) => {
                                if let Err(e) = manager.unlock_semaphore(handle) {
                                    warn!(worker, error = %e, "unlock failed");
                                }
                            }
                            Err(e) => {
                                debug!(worker, error = %e, "lock failed");
                                failed += 1;
                            }
                        }
                    }
                    failed
                })
            })
            .collect();

        handles.into_iter().try_fold(0, |total, worker| {
            worker
                .join()
                .map(|failed| total + failed)
                .map_err(|_| CliError::Worker("stress worker panicked".to_string()))
        })
    })?;
    let elapsed_ms = started.elapsed().as_millis();

    let snapshot = manager.semaphore_snapshot(handle)?;
    let report = StressReport {
        handle,
        workers,
        iterations,
        initial_count,
        final_count: snapshot.logical_count,
        token_count: snapshot.token_count,
        failed_locks,
        balanced: snapshot.logical_count == i64::from(initial_count),
        elapsed_ms,
    };
    manager.delete_semaphore(handle)?;
    Ok(report)
}
