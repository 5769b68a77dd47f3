//! Host environment collaborators
//!
//! The coordinator never routes or scrolls by itself. Triggers call out to a
//! [`Navigator`] and a [`Viewport`] supplied by the host application.
//! [`SimulatedRouter`] implements both in memory for the CLI and for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

/// Errors surfaced by a navigation primitive
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Navigation to {path} rejected: {reason}")]
    Rejected { path: String, reason: String },

    #[error("Invalid navigation target: {0}")]
    InvalidTarget(String),
}

/// Options forwarded untouched to the navigation primitive
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing
    pub replace: bool,

    /// Opaque state attached to the history entry
    pub state: Option<serde_json::Value>,
}

impl NavigateOptions {
    pub fn replace() -> Self {
        Self {
            replace: true,
            ..Default::default()
        }
    }
}

/// The host's "go to path X" primitive
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, options: &NavigateOptions) -> Result<(), NavigationError>;
}

/// The host's scroll-position control
pub trait Viewport: Send + Sync {
    /// Reset scroll to the document origin
    fn scroll_to_top(&self);
}

/// In-memory router
///
/// Publishes its location on a watch channel so a
/// [`RouteTracker`](crate::triggers::RouteTracker) can follow it.
pub struct SimulatedRouter {
    location: watch::Sender<String>,
    history: Mutex<Vec<String>>,
    rejected: Mutex<HashSet<String>>,
    scroll_resets: AtomicUsize,
}

impl SimulatedRouter {
    /// Create a router sitting at `initial`
    pub fn new(initial: impl Into<String>) -> Self {
        let initial = initial.into();
        debug!(%initial, "SimulatedRouter::new: called");
        let (location, _) = watch::channel(initial.clone());
        Self {
            location,
            history: Mutex::new(vec![initial]),
            rejected: Mutex::new(HashSet::new()),
            scroll_resets: AtomicUsize::new(0),
        }
    }

    /// Current location
    pub fn location(&self) -> String {
        self.location.borrow().clone()
    }

    /// Follow location changes
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.location.subscribe()
    }

    /// Every location visited, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Make future navigations to `path` fail
    pub fn reject(&self, path: impl Into<String>) {
        self.rejected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into());
    }

    /// How many times the viewport was reset
    pub fn scroll_resets(&self) -> usize {
        self.scroll_resets.load(Ordering::SeqCst)
    }
}

impl Navigator for SimulatedRouter {
    fn navigate(&self, path: &str, options: &NavigateOptions) -> Result<(), NavigationError> {
        debug!(%path, replace = options.replace, "SimulatedRouter::navigate: called");

        if !path.starts_with('/') {
            return Err(NavigationError::InvalidTarget(path.to_string()));
        }
        if self
            .rejected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
        {
            return Err(NavigationError::Rejected {
                path: path.to_string(),
                reason: "blocked by router".to_string(),
            });
        }

        {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            if options.replace {
                history.pop();
            }
            history.push(path.to_string());
        }

        info!(%path, "SimulatedRouter: navigated");
        self.location.send_replace(path.to_string());
        Ok(())
    }
}

impl Viewport for SimulatedRouter {
    fn scroll_to_top(&self) {
        debug!("SimulatedRouter::scroll_to_top: called");
        self.scroll_resets.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_updates_location_and_history() {
        let router = SimulatedRouter::new("/");
        router.navigate("/diet", &NavigateOptions::default()).unwrap();
        assert_eq!(router.location(), "/diet");
        assert_eq!(router.history(), vec!["/", "/diet"]);
    }

    #[test]
    fn test_replace_overwrites_last_entry() {
        let router = SimulatedRouter::new("/");
        router.navigate("/login", &NavigateOptions::default()).unwrap();
        router.navigate("/dashboard", &NavigateOptions::replace()).unwrap();
        assert_eq!(router.history(), vec!["/", "/dashboard"]);
    }

    #[test]
    fn test_rejected_path() {
        let router = SimulatedRouter::new("/");
        router.reject("/admin");
        let err = router.navigate("/admin", &NavigateOptions::default()).unwrap_err();
        assert!(err.to_string().contains("/admin"));
        assert_eq!(router.location(), "/");
    }

    #[test]
    fn test_relative_path_is_invalid() {
        let router = SimulatedRouter::new("/");
        let err = router.navigate("week/12", &NavigateOptions::default()).unwrap_err();
        assert!(matches!(err, NavigationError::InvalidTarget(_)));
    }

    #[tokio::test]
    async fn test_subscribers_follow_location() {
        let router = SimulatedRouter::new("/");
        let mut rx = router.subscribe();
        router.navigate("/community", &NavigateOptions::default()).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), "/community");
    }

    #[test]
    fn test_scroll_resets_counted() {
        let router = SimulatedRouter::new("/");
        router.scroll_to_top();
        router.scroll_to_top();
        assert_eq!(router.scroll_resets(), 2);
    }
}
