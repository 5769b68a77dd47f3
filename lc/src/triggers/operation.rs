//! Tracked async operations
//!
//! For work whose end is observable (a request, a file load), hold a source
//! for exactly as long as the future runs instead of guessing a duration.

use std::future::Future;

use tracing::debug;

use crate::source::TASK;
use crate::store::LoadingStore;

/// Run `fut` with a unique `{tag}-N` source held for its whole lifetime
///
/// The source is released when the future completes, whatever it returns,
/// and also if the future is dropped before completing or unwinds.
pub async fn track<F, T>(store: &LoadingStore, tag: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    let guard = store.hold(tag);
    debug!(source = %guard.source(), "track: started");
    let output = fut.await;
    debug!(source = %guard.source(), "track: finished");
    guard.release();
    output
}

/// [`track`] with the default `task` tag
pub async fn track_task<F, T>(store: &LoadingStore, fut: F) -> T
where
    F: Future<Output = T>,
{
    track(store, TASK, fut).await
}
