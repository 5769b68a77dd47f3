//! Loading store: the source registry and the aggregator over it
//!
//! - [`Registry`] is the plain set of active sources.
//! - [`LoadingStore`] owns it, derives visibility (`len > 0`) and notifies
//!   subscribers on every flip.
//! - [`SourceGuard`] ties one source to a scope.

mod aggregator;
mod guard;
mod registry;

pub use aggregator::LoadingStore;
pub use guard::SourceGuard;
pub use registry::Registry;
