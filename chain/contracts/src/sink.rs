//! Event sinks
//!
//! A sink receives every custody event after the transition that produced it
//! has committed. Sinks are fire-and-forget: they return nothing and cannot
//! influence control flow.

use std::sync::{Mutex, PoisonError};

use tracing::info;

use crate::events::CustodyEvent;

/// Destination for custody events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &CustodyEvent);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &CustodyEvent) {}
}

/// Append-only in-memory log.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<CustodyEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events emitted so far.
    pub fn events(&self) -> Vec<CustodyEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain all events (consume and clear).
    pub fn drain(&self) -> Vec<CustodyEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &CustodyEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Writes each event as a structured `tracing` record with a JSON body.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &CustodyEvent) {
        match serde_json::to_string(event) {
            Ok(body) => info!(
                target: "custody::events",
                event = event.label(),
                object_id = %event.object_id(),
                body = %body,
                "custody event"
            ),
            Err(err) => tracing::error!(
                target: "custody::events",
                event = event.label(),
                error = %err,
                "failed to encode custody event"
            ),
        }
    }
}
