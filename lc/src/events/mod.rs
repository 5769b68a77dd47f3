//! Loading events for observability
//!
//! Every store emits a [`LoadingEvent`] for each effective registry change
//! on its [`EventBus`]. The [`EventLogger`] can persist the stream as JSONL.
//!
//! ```text
//!   add_source / remove_source / dispose
//!                  │
//!                  ▼
//!        ┌───────────────────┐
//!        │     EventBus      │  (tokio broadcast)
//!        └───────────────────┘
//!            │            │
//!            ▼            ▼
//!       EventLogger    CLI / tests
//! ```

mod bus;
mod logger;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus};
pub use logger::{EventLogger, read_events};
pub use types::{EventLogEntry, LoadingEvent};
