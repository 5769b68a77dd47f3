//! RAII ownership of a single loading source

use tracing::debug;

use super::aggregator::LoadingStore;
use crate::source::SourceId;

/// Holds one source in a [`LoadingStore`] until released or dropped
///
/// The removal runs exactly once, on whichever comes first. This is the
/// "finally" path for any operation that must not leak its source.
#[must_use = "dropping the guard releases the source immediately"]
pub struct SourceGuard {
    store: LoadingStore,
    source: SourceId,
    released: bool,
}

impl SourceGuard {
    pub(crate) fn new(store: LoadingStore, source: SourceId) -> Self {
        Self {
            store,
            source,
            released: false,
        }
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    /// Release the source now instead of at drop
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if !self.released {
            debug!(source = %self.source, "SourceGuard: releasing");
            self.released = true;
            self.store.remove_source(&self.source);
        }
    }
}

impl Drop for SourceGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl std::fmt::Debug for SourceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceGuard")
            .field("source", &self.source)
            .field("released", &self.released)
            .finish()
    }
}
