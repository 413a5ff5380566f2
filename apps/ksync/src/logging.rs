//! Structured logging integration for events
//!
//! Converts domain events drained from the manager's channel into tracing
//! records with structured fields.

use ksync_events::{AppEvent, EventMessage, RegionEvent, SemaphoreEvent};
use tracing::{debug, info, trace, warn};

/// Install the global subscriber. `RUST_LOG` overrides the configured filter.
pub fn init_tracing(filter: &str, json_mode: bool, debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "debug,ksync=trace"
    } else {
        filter
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    // Reports go to stdout; keep logs on stderr so they never interleave
    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .with_target(debug_enabled)
            .init();
    }
}

/// Log an event using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    match &message.event {
        AppEvent::Semaphore(event) => log_semaphore_event(message, event),
        AppEvent::Region(event) => log_region_event(message, event),
    }
}

fn log_semaphore_event(message: &EventMessage, event: &SemaphoreEvent) {
    let meta = &message.meta;
    match event {
        SemaphoreEvent::Created {
            handle,
            initial_count,
        } => {
            info!(
                correlation = %meta.correlation,
                event_id = %meta.event_id,
                handle = %handle,
                initial_count,
                "Semaphore created"
            );
        }
        SemaphoreEvent::Deleted { handle } => {
            info!(correlation = %meta.correlation, handle = %handle, "Semaphore deleted");
        }
        SemaphoreEvent::Locked {
            handle,
            units,
            flags,
            logical_count,
        } => {
            debug!(
                correlation = %meta.correlation,
                handle = %handle,
                units,
                flags = %flags,
                logical_count,
                "Semaphore locked"
            );
        }
        SemaphoreEvent::Unlocked {
            handle,
            units,
            logical_count,
        } => {
            debug!(
                correlation = %meta.correlation,
                handle = %handle,
                units,
                logical_count,
                "Semaphore unlocked"
            );
        }
        SemaphoreEvent::WaitQueueNotified {
            wait_queue,
            released,
        } => {
            trace!(
                correlation = %meta.correlation,
                wait_queue = %wait_queue,
                released = ?released,
                "Wait queue notified"
            );
        }
        SemaphoreEvent::Reset { handle, count } => {
            info!(correlation = %meta.correlation, handle = %handle, count, "Semaphore reset");
        }
        SemaphoreEvent::SleepFinished { handle } => {
            debug!(
                correlation = %meta.correlation,
                handle = %handle,
                "Sleep finished"
            );
        }
        SemaphoreEvent::Woken {
            handle,
            wake_all,
            releases,
            logical_count,
        } => {
            info!(
                correlation = %meta.correlation,
                handle = %handle,
                wake_all,
                releases,
                logical_count,
                "Semaphore woken"
            );
        }
        SemaphoreEvent::OperationFailed {
            operation,
            handle,
            failure,
        } => {
            warn!(
                correlation = %meta.correlation,
                event_id = %meta.event_id,
                operation = %operation,
                handle = %handle,
                retryable = failure.retryable,
                code = ?failure.code,
                hint = ?failure.hint,
                "{}",
                failure.message
            );
        }
    }
}

fn log_region_event(message: &EventMessage, event: &RegionEvent) {
    let meta = &message.meta;
    match event {
        RegionEvent::Added { start, size, mask } => {
            info!(correlation = %meta.correlation, start, size, mask, "Region added");
        }
        RegionEvent::Released { start, size, mask } => {
            info!(correlation = %meta.correlation, start, size, mask, "Region released");
        }
        RegionEvent::Freed { start, size, mask } => {
            info!(correlation = %meta.correlation, start, size, mask, "Region freed");
        }
        RegionEvent::LookupFailed {
            operation,
            start,
            failure,
        } => {
            warn!(
                correlation = %meta.correlation,
                operation = %operation,
                start,
                code = ?failure.code,
                "{}",
                failure.message
            );
        }
    }
}
