//! Structured observability hook.
//!
//! The facade reports what it does through the `log` facade. Hosts that need
//! machine-readable records instead (audit trails, metrics, tracing bridges)
//! register an [`EventObserver`] and receive [`RandomEvent`]s synchronously
//! on the calling thread.

use alloc::vec::Vec;
use std::sync::Mutex;

use crate::entropy::{SourceError, Strength};
use crate::error::ErrorKind;

/// Outcome of probing one fallback candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Accepted,
    Rejected(SourceError),
    /// Skipped by policy (non-cryptographic candidate in strict mode).
    Skipped,
}

/// Things worth recording about a facade.
#[derive(Debug, Clone, PartialEq)]
pub enum RandomEvent {
    /// A fallback candidate was probed during construction.
    Probed {
        source: &'static str,
        outcome: ProbeOutcome,
    },
    /// A source was committed for the facade's lifetime.
    Committed {
        source: &'static str,
        platform: &'static str,
        strength: Strength,
    },
    /// A request was served.
    Generated {
        operation: &'static str,
        bytes: usize,
    },
    /// A request failed.
    Failed {
        operation: &'static str,
        kind: ErrorKind,
    },
}

/// Receiver for [`RandomEvent`]s.
pub trait EventObserver: Send + Sync {
    fn on_event(&self, event: &RandomEvent);
}

/// Observer that keeps every event in memory.
pub struct EventLog {
    entries: Mutex<Vec<RandomEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of the recorded events.
    pub fn entries(&self) -> Vec<RandomEvent> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventObserver for EventLog {
    fn on_event(&self, event: &RandomEvent) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
