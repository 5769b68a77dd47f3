//! LoadingStore - owns the registry and publishes derived visibility

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::guard::SourceGuard;
use super::registry::Registry;
use crate::events::{DEFAULT_CHANNEL_CAPACITY, EventBus, LoadingEvent};
use crate::source::{GENERIC, SourceId};

struct State {
    registry: Registry,
    disposed: bool,
}

struct Inner {
    id: String,
    state: Mutex<State>,
    visible: watch::Sender<bool>,
    events: EventBus,
}

/// The loading-state aggregator
///
/// Cloning yields another handle to the same registry. Build one at
/// application start, pass it to every trigger, and call [`dispose`] on
/// shutdown.
///
/// All operations are synchronous and infallible. Visibility is recomputed
/// on every effective mutation and published before the call returns.
///
/// [`dispose`]: LoadingStore::dispose
#[derive(Clone)]
pub struct LoadingStore {
    inner: Arc<Inner>,
}

impl LoadingStore {
    /// Create an empty store with the default event capacity
    pub fn new() -> Self {
        Self::with_event_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create an empty store whose event bus buffers `capacity` events
    pub fn with_event_capacity(capacity: usize) -> Self {
        let id = Uuid::now_v7().to_string();
        info!(store_id = %id, "LoadingStore created");
        let (visible, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                id,
                state: Mutex::new(State {
                    registry: Registry::new(),
                    disposed: false,
                }),
                visible,
                events: EventBus::new(capacity),
            }),
        }
    }

    /// Instance id, stamped on every event this store emits
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Mutations never panic mid-update, so a poisoned lock still holds a valid set
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a pending operation
    ///
    /// Adding an id that is already present has no effect. Once the store is
    /// disposed, adds are ignored.
    pub fn add_source(&self, source: impl Into<SourceId>) {
        let source = source.into();
        debug!(store_id = %self.inner.id, %source, "LoadingStore::add_source: called");

        let mut state = self.lock();
        if state.disposed {
            warn!(store_id = %self.inner.id, %source, "add_source after dispose ignored");
            return;
        }
        if !state.registry.insert(source.clone()) {
            debug!(%source, "LoadingStore::add_source: already present");
            return;
        }

        let active = state.registry.len();
        self.inner.events.emit(LoadingEvent::SourceAdded {
            store_id: self.inner.id.clone(),
            source,
            active,
        });
        self.publish(active);
    }

    /// Release a pending operation; removing an absent id is a no-op
    pub fn remove_source(&self, source: impl AsRef<str>) {
        let source = source.as_ref();
        debug!(store_id = %self.inner.id, %source, "LoadingStore::remove_source: called");

        let mut state = self.lock();
        if !state.registry.remove(source) {
            debug!(%source, "LoadingStore::remove_source: not present");
            return;
        }

        let active = state.registry.len();
        self.inner.events.emit(LoadingEvent::SourceRemoved {
            store_id: self.inner.id.clone(),
            source: SourceId::new(source),
            active,
        });
        self.publish(active);
    }

    /// Single-flag convenience: toggles the `generic` source
    pub fn set_loading(&self, loading: bool) {
        debug!(store_id = %self.inner.id, loading, "LoadingStore::set_loading: called");
        if loading {
            self.add_source(SourceId::generic());
        } else {
            self.remove_source(GENERIC);
        }
    }

    /// Register a uniquely-named source that is released when the guard drops
    pub fn hold(&self, tag: &str) -> SourceGuard {
        let source = SourceId::unique(tag);
        self.add_source(&source);
        SourceGuard::new(self.clone(), source)
    }

    /// Current derived visibility
    pub fn is_loading(&self) -> bool {
        *self.inner.visible.borrow()
    }

    /// Watch derived visibility; the receiver sees every flip
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        debug!(store_id = %self.inner.id, "LoadingStore::subscribe: called");
        self.inner.visible.subscribe()
    }

    /// Subscribe to the store's event stream
    pub fn subscribe_events(&self) -> broadcast::Receiver<LoadingEvent> {
        self.inner.events.subscribe()
    }

    pub fn contains(&self, source: impl AsRef<str>) -> bool {
        self.lock().registry.contains(source.as_ref())
    }

    pub fn len(&self) -> usize {
        self.lock().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().registry.is_empty()
    }

    /// Sorted snapshot of the active sources, for diagnostics
    pub fn active_sources(&self) -> Vec<SourceId> {
        self.lock().registry.snapshot()
    }

    /// Tear the store down
    ///
    /// Clears the registry unconditionally and forces visibility to false,
    /// whatever triggers still believe they hold. Later adds are ignored.
    pub fn dispose(&self) {
        let mut state = self.lock();
        let cleared = state.registry.clear();
        state.disposed = true;

        if cleared > 0 {
            warn!(store_id = %self.inner.id, cleared, "LoadingStore disposed with outstanding sources");
        } else {
            info!(store_id = %self.inner.id, "LoadingStore disposed");
        }

        self.inner.events.emit(LoadingEvent::RegistryCleared {
            store_id: self.inner.id.clone(),
            cleared,
        });
        self.publish(0);
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    // Caller holds the state lock, so publications follow mutation order.
    fn publish(&self, active: usize) {
        let visible = active > 0;
        let changed = self.inner.visible.send_if_modified(|current| {
            if *current == visible {
                false
            } else {
                *current = visible;
                true
            }
        });

        if changed {
            debug!(store_id = %self.inner.id, visible, active, "LoadingStore: visibility changed");
            self.inner.events.emit(LoadingEvent::VisibilityChanged {
                store_id: self.inner.id.clone(),
                visible,
            });
        }
    }
}

impl Default for LoadingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoadingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("LoadingStore")
            .field("id", &self.inner.id)
            .field("active", &state.registry.len())
            .field("disposed", &state.disposed)
            .finish()
    }
}
