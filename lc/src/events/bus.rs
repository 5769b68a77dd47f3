//! Event Bus - broadcast fan-out of loading events
//!
//! Each store owns one bus. Consumers (event logger, CLI, tests) subscribe;
//! emitting never blocks and never fails.

use tokio::sync::broadcast;
use tracing::debug;

use super::types::LoadingEvent;

/// Default channel capacity (events)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Broadcast bus for [`LoadingEvent`]s
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LoadingEvent>,
}

impl EventBus {
    /// Create a new event bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Emit an event to all subscribers
    ///
    /// Fire-and-forget: with no subscribers the event is dropped, and slow
    /// subscribers lose the oldest events.
    pub fn emit(&self, event: LoadingEvent) {
        debug!(event_type = event.event_type(), store_id = event.store_id(), "EventBus::emit");
        let _ = self.tx.send(event);
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LoadingEvent> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}
