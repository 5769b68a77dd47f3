//! Event types for loading-state activity
//!
//! Every registry mutation that changes something emits one of these. The
//! visibility signal itself travels on the store's watch channel; events are
//! the audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::source::SourceId;

/// Observable activity of a loading store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoadingEvent {
    /// A source entered the registry
    SourceAdded {
        store_id: String,
        source: SourceId,
        /// Registry size after the insert
        active: usize,
    },
    /// A source left the registry
    SourceRemoved {
        store_id: String,
        source: SourceId,
        /// Registry size after the removal
        active: usize,
    },
    /// Derived visibility flipped
    VisibilityChanged { store_id: String, visible: bool },
    /// The store was disposed and its registry force-cleared
    RegistryCleared { store_id: String, cleared: usize },
}

impl LoadingEvent {
    /// Instance id of the store that emitted this event
    pub fn store_id(&self) -> &str {
        match self {
            Self::SourceAdded { store_id, .. }
            | Self::SourceRemoved { store_id, .. }
            | Self::VisibilityChanged { store_id, .. }
            | Self::RegistryCleared { store_id, .. } => store_id,
        }
    }

    /// Variant name, for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SourceAdded { .. } => "SourceAdded",
            Self::SourceRemoved { .. } => "SourceRemoved",
            Self::VisibilityChanged { .. } => "VisibilityChanged",
            Self::RegistryCleared { .. } => "RegistryCleared",
        }
    }

    /// The source this event concerns, if any
    pub fn source(&self) -> Option<&SourceId> {
        match self {
            Self::SourceAdded { source, .. } | Self::SourceRemoved { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A timestamped event as written to the JSONL log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: LoadingEvent,
}

impl EventLogEntry {
    /// Stamp an event with the current time
    pub fn new(event: LoadingEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}
