//! Loading source identifiers
//!
//! A [`SourceId`] names one pending operation that wants the global loading
//! indicator visible. Ids are opaque capabilities: whoever added a source is
//! the only one expected to remove it.

use std::borrow::Borrow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tag used by [`crate::LoadingStore::set_loading`]
pub const GENERIC: &str = "generic";

/// Tag for the first-paint flash emitted by the route tracker
pub const INITIAL_LOAD: &str = "initial-load";

/// Tag for route-change sources
pub const ROUTE_CHANGE: &str = "route-change";

/// Tag for programmatic navigation sources
pub const NAVIGATE: &str = "navigate";

/// Tag for page-level loading flags without a caller-supplied id
pub const PAGE_LOADING: &str = "page-loading";

/// Tag for tracked async operations
pub const TASK: &str = "task";

/// Process-wide counter backing [`SourceId::unique`]
static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of one pending operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Wrap a caller-chosen id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate an id that is unique within this process
    ///
    /// The result is `"{tag}-{n}"` where `n` comes from a monotonic counter,
    /// so two calls in the same millisecond still yield distinct ids.
    pub fn unique(tag: &str) -> Self {
        let seq = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let id = format!("{}-{}", tag, seq);
        debug!(%id, "SourceId::unique: generated");
        Self(id)
    }

    /// The id used by the single-flag convenience API
    pub fn generic() -> Self {
        Self(GENERIC.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tag portion of a generated id (everything before the last `-`)
    pub fn tag(&self) -> &str {
        match self.0.rsplit_once('-') {
            Some((tag, seq)) if !seq.is_empty() && seq.bytes().all(|b| b.is_ascii_digit()) => tag,
            _ => &self.0,
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&SourceId> for SourceId {
    fn from(id: &SourceId) -> Self {
        id.clone()
    }
}

// Lets the registry look up a `&str` without allocating a `SourceId`.
impl Borrow<str> for SourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
