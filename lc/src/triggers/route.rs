//! Route-change trigger
//!
//! Keeps the indicator up for a fixed window after every change of the
//! active path, and flashes it once on the very first observation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::LoadingConfig;
use crate::host::Viewport;
use crate::schedule::ScheduledRemoval;
use crate::source::{INITIAL_LOAD, ROUTE_CHANGE, SourceId};
use crate::store::LoadingStore;

/// Where the tracker stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    /// Nothing observed yet; the first observation flashes the indicator
    ArmedForInitialLoad,
    /// No route-change source outstanding
    Idle,
    /// A route-change source is registered and its removal timer is running
    ArmedForRouteChange,
}

/// Watches the active path and registers route-change sources
///
/// Dropping the tracker is the unmount: any outstanding removal is cancelled
/// and its source removed on the spot.
pub struct RouteTracker {
    store: LoadingStore,
    viewport: Option<Arc<dyn Viewport>>,
    route_change_delay: Duration,
    initial_load_delay: Duration,
    scroll_on_route_change: bool,
    awaiting_first: bool,
    last_path: Option<String>,
    initial: Option<ScheduledRemoval>,
    pending: Option<ScheduledRemoval>,
}

impl RouteTracker {
    pub fn new(store: LoadingStore, config: &LoadingConfig) -> Self {
        debug!(?config, "RouteTracker::new: called");
        Self {
            store,
            viewport: None,
            route_change_delay: config.route_change_delay(),
            initial_load_delay: config.initial_load_delay(),
            scroll_on_route_change: config.scroll_on_route_change,
            awaiting_first: true,
            last_path: None,
            initial: None,
            pending: None,
        }
    }

    /// Reset this viewport on every real route change
    pub fn with_viewport(mut self, viewport: Arc<dyn Viewport>) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn state(&self) -> RouteState {
        if self.awaiting_first {
            RouteState::ArmedForInitialLoad
        } else if self.pending.as_ref().is_some_and(|p| !p.is_finished()) {
            RouteState::ArmedForRouteChange
        } else {
            RouteState::Idle
        }
    }

    /// Last path that counted as a change
    pub fn current_path(&self) -> Option<&str> {
        self.last_path.as_deref()
    }

    /// Source of the outstanding route change, if any
    pub fn pending_source(&self) -> Option<&SourceId> {
        self.pending.as_ref().filter(|p| !p.is_finished()).map(|p| p.source())
    }

    /// Feed the current path
    ///
    /// Returns true if this registered a route change. Observing the path
    /// that is already recorded does nothing.
    pub fn observe(&mut self, path: &str) -> bool {
        debug!(%path, state = ?self.state(), "RouteTracker::observe: called");

        let initial = if self.awaiting_first {
            self.awaiting_first = false;
            let source = SourceId::unique(INITIAL_LOAD);
            self.store.add_source(&source);
            Some(source)
        } else {
            None
        };

        let changed = self.last_path.as_deref() != Some(path);
        if changed {
            self.register_change(path);
        } else {
            debug!(%path, "RouteTracker::observe: same path, ignoring");
        }

        // Released after the route-change source is in, so the first paint never drops to idle
        if let Some(source) = initial {
            if self.initial_load_delay.is_zero() {
                self.store.remove_source(&source);
            } else {
                self.initial = Some(ScheduledRemoval::schedule(&self.store, source, self.initial_load_delay));
            }
        }

        changed
    }

    fn register_change(&mut self, path: &str) {
        let source = SourceId::unique(ROUTE_CHANGE);
        info!(from = ?self.last_path, to = %path, %source, "Route changed");

        // New source first: superseding must not flicker the indicator
        self.store.add_source(&source);
        if let Some(previous) = self.pending.take() {
            previous.cancel();
        }

        self.last_path = Some(path.to_string());

        if self.scroll_on_route_change
            && let Some(viewport) = &self.viewport
        {
            viewport.scroll_to_top();
        }

        self.pending = Some(ScheduledRemoval::schedule(&self.store, source, self.route_change_delay));
    }

    /// Follow a location channel until it closes, then unmount
    pub async fn run(mut self, mut location: watch::Receiver<String>) {
        debug!("RouteTracker::run: starting");
        let path = location.borrow_and_update().clone();
        self.observe(&path);

        while location.changed().await.is_ok() {
            let path = location.borrow_and_update().clone();
            self.observe(&path);
        }

        debug!("RouteTracker::run: location closed, unmounting");
    }
}

impl Drop for RouteTracker {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
        if let Some(initial) = self.initial.take() {
            initial.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LoadingEvent;
    use crate::host::{NavigateOptions, Navigator, SimulatedRouter};

    fn tracker(store: &LoadingStore) -> RouteTracker {
        RouteTracker::new(store.clone(), &LoadingConfig::default())
    }

    fn route_sources(store: &LoadingStore) -> usize {
        store.active_sources().iter().filter(|s| s.tag() == ROUTE_CHANGE).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_observation_flashes_and_arms() {
        let store = LoadingStore::new();
        let mut events = store.subscribe_events();
        let mut tracker = tracker(&store);
        assert_eq!(tracker.state(), RouteState::ArmedForInitialLoad);

        assert!(tracker.observe("/"));
        assert_eq!(tracker.state(), RouteState::ArmedForRouteChange);
        assert_eq!(tracker.current_path(), Some("/"));
        assert!(store.is_loading());

        // initial-load already gone, route change still held
        assert_eq!(store.len(), 1);
        assert_eq!(route_sources(&store), 1);

        let mut initial_seen = 0;
        let mut went_idle = false;
        while let Ok(event) = events.try_recv() {
            if event.source().is_some_and(|s| s.tag() == INITIAL_LOAD) {
                initial_seen += 1;
            }
            if matches!(event, LoadingEvent::VisibilityChanged { visible: false, .. }) {
                went_idle = true;
            }
        }
        assert_eq!(initial_seen, 2, "initial-load added and removed");
        assert!(!went_idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_route_change_clears_after_delay() {
        let store = LoadingStore::new();
        let mut tracker = tracker(&store);
        tracker.observe("/a");
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(!store.is_loading());
        assert_eq!(tracker.state(), RouteState::Idle);

        assert!(tracker.observe("/b"));
        assert!(store.is_loading());

        tokio::time::sleep(Duration::from_millis(799)).await;
        assert!(store.is_loading());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!store.is_loading());
        assert_eq!(tracker.state(), RouteState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_path_does_not_retrigger() {
        let store = LoadingStore::new();
        let mut tracker = tracker(&store);
        tracker.observe("/a");
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(!tracker.observe("/a"));
        assert!(!store.is_loading());
        assert_eq!(tracker.state(), RouteState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseding_change_replaces_source() {
        let store = LoadingStore::new();
        let mut rx = store.subscribe();
        let mut tracker = tracker(&store);

        tracker.observe("/a");
        let first = tracker.pending_source().cloned().unwrap();
        let _ = rx.borrow_and_update();

        tokio::time::sleep(Duration::from_millis(500)).await;
        tracker.observe("/b");
        let second = tracker.pending_source().cloned().unwrap();

        assert_ne!(first, second);
        assert!(!store.contains(&first));
        assert!(store.contains(&second));
        assert!(!rx.has_changed().unwrap(), "indicator stayed up across the switch");

        // the new window is measured from the second change
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(store.is_loading());
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_removal() {
        let store = LoadingStore::new();
        let mut tracker = tracker(&store);
        tracker.observe("/a");
        assert!(store.is_loading());

        drop(tracker);
        assert!(store.is_empty());
        assert!(!store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_initial_load() {
        let store = LoadingStore::new();
        let config = LoadingConfig {
            initial_load_delay_ms: 1000,
            route_change_delay_ms: 100,
            ..Default::default()
        };
        let mut tracker = RouteTracker::new(store.clone(), &config);
        tracker.observe("/");
        assert_eq!(store.len(), 2);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(store.len(), 1);
        assert!(store.active_sources()[0].tag() == INITIAL_LOAD);

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(!store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_reset_on_change_only() {
        let store = LoadingStore::new();
        let router = Arc::new(SimulatedRouter::new("/"));
        let mut tracker = tracker(&store).with_viewport(router.clone());

        tracker.observe("/");
        tracker.observe("/");
        tracker.observe("/diet");
        assert_eq!(router.scroll_resets(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_reset_can_be_disabled() {
        let store = LoadingStore::new();
        let router = Arc::new(SimulatedRouter::new("/"));
        let config = LoadingConfig {
            scroll_on_route_change: false,
            ..Default::default()
        };
        let mut tracker = RouteTracker::new(store, &config).with_viewport(router.clone());
        tracker.observe("/diet");
        assert_eq!(router.scroll_resets(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_follows_router_and_unmounts() {
        let store = LoadingStore::new();
        let router = SimulatedRouter::new("/");
        let task = tokio::spawn(tracker(&store).run(router.subscribe()));

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(!store.is_loading());

        router.navigate("/week/12", &NavigateOptions::default()).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(store.is_loading());

        // closing the location channel unmounts the tracker mid-window
        drop(router);
        task.await.unwrap();
        assert!(!store.is_loading());
    }
}
