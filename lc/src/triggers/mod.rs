//! Triggers - independent producers of loading sources
//!
//! Every trigger pairs each source it adds with exactly one guaranteed
//! removal: a timer, a completion, or its own `Drop`.
//!
//! - [`RouteTracker`] - indicator window after each route change
//! - [`PageLoading`] - a page's local loading flag
//! - [`NavigateWithLoading`] - programmatic navigation with a fixed window
//! - [`track`] - held for the lifetime of an async operation

mod navigate;
mod operation;
mod page;
mod route;

pub use navigate::NavigateWithLoading;
pub use operation::{track, track_task};
pub use page::PageLoading;
pub use route::{RouteState, RouteTracker};
