//! Indicator overlay - the consumer end of derived visibility
//!
//! An [`Indicator`] is told to show or hide; it never sees sources. The
//! overlay loop renders the current value once, then every flip, until the
//! store is gone.

use chrono::Local;
use colored::Colorize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Something that can put a blocking overlay on screen
pub trait Indicator: Send + 'static {
    fn show(&mut self);
    fn hide(&mut self);
}

/// Drive `indicator` from a visibility receiver
///
/// Returns the indicator once every store handle has been dropped.
pub async fn run_overlay<I: Indicator>(mut visible: watch::Receiver<bool>, mut indicator: I) -> I {
    debug!("run_overlay: starting");
    render(&mut indicator, *visible.borrow_and_update());

    while visible.changed().await.is_ok() {
        let shown = *visible.borrow_and_update();
        render(&mut indicator, shown);
    }

    debug!("run_overlay: store closed");
    indicator
}

/// Spawn [`run_overlay`] as a background task
pub fn spawn_overlay<I: Indicator>(visible: watch::Receiver<bool>, indicator: I) -> JoinHandle<I> {
    tokio::spawn(run_overlay(visible, indicator))
}

fn render<I: Indicator>(indicator: &mut I, shown: bool) {
    debug!(shown, "overlay: render");
    if shown {
        indicator.show();
    } else {
        indicator.hide();
    }
}

/// Prints each transition to stdout
#[derive(Debug, Default)]
pub struct TerminalIndicator {
    shown: Option<bool>,
}

impl TerminalIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    fn print(&mut self, shown: bool) {
        if self.shown == Some(shown) {
            return;
        }
        self.shown = Some(shown);
        let stamp = Local::now().format("%H:%M:%S%.3f");
        if shown {
            println!("{} {}", stamp.to_string().dimmed(), "● loading".magenta().bold());
        } else {
            println!("{} {}", stamp.to_string().dimmed(), "○ idle".green());
        }
    }
}

impl Indicator for TerminalIndicator {
    fn show(&mut self) {
        self.print(true);
    }

    fn hide(&mut self) {
        self.print(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LoadingStore;

    #[derive(Default)]
    struct Recording {
        frames: Vec<bool>,
    }

    impl Indicator for Recording {
        fn show(&mut self) {
            self.frames.push(true);
        }

        fn hide(&mut self) {
            self.frames.push(false);
        }
    }

    #[tokio::test]
    async fn test_overlay_renders_initial_and_flips() {
        let store = LoadingStore::new();
        let overlay = spawn_overlay(store.subscribe(), Recording::default());
        tokio::task::yield_now().await;

        store.add_source("a");
        tokio::task::yield_now().await;
        store.remove_source("a");
        tokio::task::yield_now().await;

        drop(store);
        let recording = overlay.await.unwrap();
        assert_eq!(recording.frames, vec![false, true, false]);
    }

    #[tokio::test]
    async fn test_overlay_starts_visible_when_sources_exist() {
        let store = LoadingStore::new();
        store.set_loading(true);
        let overlay = spawn_overlay(store.subscribe(), Recording::default());
        tokio::task::yield_now().await;

        drop(store);
        let recording = overlay.await.unwrap();
        assert_eq!(recording.frames, vec![true]);
    }

    #[test]
    fn test_terminal_indicator_dedupes() {
        let mut indicator = TerminalIndicator::new();
        indicator.show();
        indicator.show();
        assert_eq!(indicator.shown, Some(true));
        indicator.hide();
        assert_eq!(indicator.shown, Some(false));
    }
}
