//! LoadCoord - multi-source loading-state coordinator
//!
//! Decides when a full-screen loading indicator is visible while several
//! overlapping operations (route changes, page fetches, programmatic
//! navigations) come and go.
//!
//! # Core Concepts
//!
//! - **Sources, not flags**: each pending operation registers a unique
//!   [`SourceId`]; the indicator is visible iff at least one is registered
//! - **Single owner**: the [`LoadingStore`] owns the registry; triggers only
//!   hold ids
//! - **Guaranteed removal**: every trigger pairs an add with exactly one
//!   removal path (timer, completion, or `Drop`)
//! - **Explicit lifecycle**: the store is built at startup and disposed at
//!   shutdown, which force-clears anything leaked
//!
//! # Modules
//!
//! - [`store`] - registry and aggregator
//! - [`triggers`] - route tracker, page flag, navigation wrapper, tracked ops
//! - [`schedule`] - cancellable delayed removal
//! - [`overlay`] - indicator consumer
//! - [`host`] - navigator/viewport seams and an in-memory router
//! - [`events`] - event bus and JSONL event log
//! - [`scenario`] - scripted runs for the CLI
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod events;
pub mod host;
pub mod overlay;
pub mod scenario;
pub mod schedule;
pub mod source;
pub mod store;
pub mod triggers;

pub use config::{Config, EventsConfig, LoadingConfig};
pub use events::{EventBus, EventLogEntry, EventLogger, LoadingEvent, read_events};
pub use host::{NavigateOptions, NavigationError, Navigator, SimulatedRouter, Viewport};
pub use overlay::{Indicator, TerminalIndicator, run_overlay, spawn_overlay};
pub use scenario::{Scenario, ScenarioError, ScenarioReport, ScenarioRunner, Step};
pub use schedule::ScheduledRemoval;
pub use source::SourceId;
pub use store::{LoadingStore, Registry, SourceGuard};
pub use triggers::{NavigateWithLoading, PageLoading, RouteState, RouteTracker, track, track_task};
