//! Programmatic-navigation trigger

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::host::{NavigateOptions, NavigationError, Navigator, Viewport};
use crate::schedule::ScheduledRemoval;
use crate::source::{NAVIGATE, SourceId};
use crate::store::LoadingStore;

/// Wraps a navigation primitive so every call shows the indicator
///
/// Each call adds a fresh `navigate-N` source, scrolls to the top, navigates
/// and schedules the source's removal after a fixed duration. The removal is
/// a timer, so it fires whether or not the navigation succeeded.
#[derive(Clone)]
pub struct NavigateWithLoading {
    store: LoadingStore,
    navigator: Arc<dyn Navigator>,
    viewport: Arc<dyn Viewport>,
    duration: Duration,
}

impl NavigateWithLoading {
    pub fn new(
        store: LoadingStore,
        navigator: Arc<dyn Navigator>,
        viewport: Arc<dyn Viewport>,
        duration: Duration,
    ) -> Self {
        Self {
            store,
            navigator,
            viewport,
            duration,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Navigate to `path` with the indicator up for the configured duration
    pub fn navigate(&self, path: &str, options: &NavigateOptions) -> Result<(), NavigationError> {
        let source = SourceId::unique(NAVIGATE);
        debug!(%path, %source, duration = ?self.duration, "NavigateWithLoading::navigate: called");

        self.store.add_source(&source);
        self.viewport.scroll_to_top();
        let result = self.navigator.navigate(path, options);

        // Detached: the timer owns the removal from here on
        drop(ScheduledRemoval::schedule(&self.store, source, self.duration));

        if let Err(e) = &result {
            warn!(%path, error = %e, "Navigation failed; indicator clears on its timer");
        }
        result
    }
}
