//! Page-loading trigger
//!
//! Projects a page's local "am I loading" flag into the global store without
//! the page having to manage ids.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::debug;

use crate::source::{PAGE_LOADING, SourceId};
use crate::store::LoadingStore;

/// One page's loading flag, bound to a single source id for its lifetime
///
/// Only changes of the flag (or of the declared dependencies) touch the
/// store; repeated updates with the same values are ignored. Dropping the
/// value removes the source whatever the last flag was.
pub struct PageLoading {
    store: LoadingStore,
    source: SourceId,
    loading: bool,
    deps: Option<u64>,
}

impl PageLoading {
    /// Bind with a generated id, stable for the life of this value
    pub fn new(store: LoadingStore) -> Self {
        Self::with_id(store, SourceId::unique(PAGE_LOADING))
    }

    /// Bind with a caller-chosen id
    pub fn with_id(store: LoadingStore, source: impl Into<SourceId>) -> Self {
        let source = source.into();
        debug!(%source, "PageLoading::with_id: called");
        Self {
            store,
            source,
            loading: false,
            deps: None,
        }
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    /// Last flag seen
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Report the page's current flag
    pub fn update(&mut self, loading: bool) {
        if loading == self.loading {
            return;
        }
        self.apply(loading);
    }

    /// Report the flag together with the values it depends on
    ///
    /// A change in `deps` re-applies the current flag even if the flag itself
    /// did not change.
    pub fn update_with_deps<D: Hash + ?Sized>(&mut self, loading: bool, deps: &D) {
        let mut hasher = DefaultHasher::new();
        deps.hash(&mut hasher);
        let fingerprint = hasher.finish();

        let deps_changed = self.deps != Some(fingerprint);
        self.deps = Some(fingerprint);

        if deps_changed || loading != self.loading {
            self.apply(loading);
        }
    }

    fn apply(&mut self, loading: bool) {
        debug!(source = %self.source, loading, "PageLoading::apply: called");
        self.loading = loading;
        if loading {
            self.store.add_source(&self.source);
        } else {
            self.store.remove_source(&self.source);
        }
    }
}

impl Drop for PageLoading {
    fn drop(&mut self) {
        debug!(source = %self.source, "PageLoading: unmounted");
        self.store.remove_source(&self.source);
    }
}
