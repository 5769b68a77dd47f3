//! Cancellable delayed removal of a loading source

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::source::SourceId;
use crate::store::LoadingStore;

/// A pending "remove this source after a delay" timer
///
/// The timer runs as a tokio task. [`cancel`] stops it and removes the
/// source right away. Dropping the handle without cancelling leaves the
/// timer running, so the source is still removed when the delay elapses.
///
/// [`cancel`]: ScheduledRemoval::cancel
pub struct ScheduledRemoval {
    store: LoadingStore,
    source: SourceId,
    delay: Duration,
    task: JoinHandle<()>,
}

impl ScheduledRemoval {
    /// Start the timer
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(store: &LoadingStore, source: SourceId, delay: Duration) -> Self {
        debug!(%source, ?delay, "ScheduledRemoval::schedule: called");
        let task = tokio::spawn({
            let store = store.clone();
            let source = source.clone();
            async move {
                tokio::time::sleep(delay).await;
                debug!(%source, "ScheduledRemoval: delay elapsed");
                store.remove_source(&source);
            }
        });

        Self {
            store: store.clone(),
            source,
            delay,
            task,
        }
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// True once the timer has fired (or was aborted)
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the timer and remove the source immediately
    pub fn cancel(self) {
        debug!(source = %self.source, "ScheduledRemoval::cancel: called");
        self.task.abort();
        self.store.remove_source(&self.source);
    }
}

impl std::fmt::Debug for ScheduledRemoval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledRemoval")
            .field("source", &self.source)
            .field("delay", &self.delay)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}
