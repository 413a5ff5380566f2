#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for ksync
//!
//! Every manager operation can report what it did as a domain event. Events
//! travel over an unbounded channel whose sender is usable from plain OS
//! threads, so blocking workers can emit without an async runtime.
//!
//! Each message carries a [`Correlation`] naming the semaphore handle or
//! region start it concerns, and each event knows its own log level and
//! target.

pub mod meta;
pub use meta::{Correlation, EventLevel, EventMeta};

pub mod events;
pub use events::{AppEvent, FailureContext, RegionEvent, SemaphoreEvent};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// An event together with its emission metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    /// Wrap an event, deriving level and correlation from the event itself
    #[must_use]
    pub fn new(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.log_level(), event.correlation());
        Self { meta, event }
    }

    /// Render as a single JSON line
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ksync_errors::Error> {
        Ok(serde_json::to_string(self)?)
    }
}

pub type EventSender = UnboundedSender<EventMessage>;

pub type EventReceiver = UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Anything that may hold an event sender.
///
/// Emission is fire-and-forget: with no sender, or with the receiver gone,
/// events are silently dropped.
pub trait EventEmitter {
    fn event_sender(&self) -> Option<&EventSender>;

    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            let _ = sender.send(EventMessage::new(event));
        }
    }

    fn emit_semaphore(&self, event: SemaphoreEvent) {
        self.emit(AppEvent::Semaphore(event));
    }

    fn emit_region(&self, event: RegionEvent) {
        self.emit(AppEvent::Region(event));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

/// Components where events are opt-in hold an `Option`
impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
