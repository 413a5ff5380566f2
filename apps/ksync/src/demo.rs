//! Reference scenario
//!
//! Two semaphores (counts 1 and 0), four regions, every manager operation
//! once, then the final counts and the trimmed region listing.

use std::sync::Mutex;
use std::time::Duration;

use ksync_manager::{LockFlags, Manager, Result, SemHandle, Status};
use ksync_types::Timeout;
use serde::Serialize;
use tracing::info;

const STEP_TIMEOUT: Timeout = Timeout::After(Duration::from_secs(5));

#[derive(Debug, Serialize)]
pub struct DemoStep {
    pub operation: String,
    pub status: Status,
}

#[derive(Debug, Serialize)]
pub struct SemaphoreCount {
    pub handle: SemHandle,
    pub logical_count: i64,
    pub token_count: u64,
}

#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub initial_regions: Vec<String>,
    pub steps: Vec<DemoStep>,
    pub counts: Vec<SemaphoreCount>,
    pub final_regions: Vec<String>,
}

impl DemoReport {
    fn record<T>(&mut self, operation: impl Into<String>, result: &Result<T>) {
        self.steps.push(DemoStep {
            operation: operation.into(),
            status: Status::of(result),
        });
    }

    pub fn print(&self) {
        println!("Initial Resource Tree:");
        for line in &self.initial_regions {
            println!("{line}");
        }
        for step in &self.steps {
            println!("  {:<40} {}", step.operation, step.status);
        }
        println!("After semaphore operations:");
        for count in &self.counts {
            println!("Semaphore {}: Count = {}", count.handle, count.logical_count);
        }
        println!("Resource Tree after releasing and freeing resources:");
        for line in &self.final_regions {
            println!("{line}");
        }
    }
}

/// Run the scenario on `manager`. Individual operation failures are
/// recorded in the report, not returned.
///
/// # Errors
///
/// Returns an error only if one of the scenario's own semaphores vanished.
pub fn run(mut manager: Manager, sleep: Duration) -> Result<DemoReport> {
    let sem1 = manager.create_semaphore(1);
    let sem2 = manager.create_semaphore(0);

    manager.add_resource(0, 100, 1);
    manager.add_resource(10, 20, 2);
    manager.add_resource(40, 30, 1);
    manager.add_resource(80, 10, 2);

    let mut report = DemoReport {
        initial_regions: manager.print_resources().collect(),
        steps: Vec::new(),
        counts: Vec::new(),
        final_regions: Vec::new(),
    };

    let flags = LockFlags::NONE;
    report.record(
        format!("lock_semaphore({sem1})"),
        &manager.lock_semaphore(sem1, flags, STEP_TIMEOUT),
    );
    report.record(
        format!("unlock_semaphore({sem1})"),
        &manager.unlock_semaphore(sem1),
    );
    report.record(
        format!("lock_semaphore_ex({sem1}, 1)"),
        &manager.lock_semaphore_ex(sem1, 1, flags, STEP_TIMEOUT),
    );
    report.record(
        format!("unlock_semaphore_ex({sem1}, 1)"),
        &manager.unlock_semaphore_ex(sem1, 1),
    );
    report.record(
        format!("unlock_and_suspend({sem2}, {sem1})"),
        &manager.unlock_and_suspend(sem2, sem1),
    );

    let external = Mutex::new(());
    report.record(
        format!("spinunlock_and_suspend({sem2})"),
        &manager.spinunlock_and_suspend(sem2, &external, flags, STEP_TIMEOUT),
    );
    report.record(
        format!("reset_semaphore({sem1}, 2)"),
        &manager.reset_semaphore(sem1, 2),
    );

    info!(handle = %sem2, timeout = ?sleep, "sleeping on empty semaphore");
    report.record(
        format!("sleep_on_sem({sem2})"),
        &manager.sleep_on_sem(sem2, sleep),
    );
    report.record(
        format!("wakeup_sem({sem2}, wake_all)"),
        &manager.wakeup_sem(sem2, true),
    );

    for handle in [sem1, sem2] {
        let snapshot = manager.semaphore_snapshot(handle)?;
        report.counts.push(SemaphoreCount {
            handle,
            logical_count: snapshot.logical_count,
            token_count: snapshot.token_count,
        });
    }

    report.record("release_region(40, 30)", &manager.release_region(40, 30));
    report.record("free_resource(10, 2)", &manager.free_resource(10, 2));
    report.final_regions = manager.print_resources().collect();

    Ok(report)
}
