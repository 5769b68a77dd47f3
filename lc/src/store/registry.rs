//! Source registry - the set of currently active loading sources

use std::collections::HashSet;

use crate::source::SourceId;

/// Set of active [`SourceId`]s
///
/// Adds and removes are idempotent. Visibility is derived from
/// [`Registry::is_empty`] and nothing else.
#[derive(Debug, Default)]
pub struct Registry {
    sources: HashSet<SourceId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a source; returns true if it was not already present
    pub fn insert(&mut self, source: SourceId) -> bool {
        self.sources.insert(source)
    }

    /// Remove a source; returns true if it was present
    pub fn remove(&mut self, source: &str) -> bool {
        self.sources.remove(source)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.sources.contains(source)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Drop every source; returns how many were present
    pub fn clear(&mut self) -> usize {
        let count = self.sources.len();
        self.sources.clear();
        count
    }

    /// Sorted snapshot of the active sources
    pub fn snapshot(&self) -> Vec<SourceId> {
        let mut sources: Vec<SourceId> = self.sources.iter().cloned().collect();
        sources.sort();
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut registry = Registry::new();
        assert!(registry.insert(SourceId::new("a")));
        assert!(!registry.insert(SourceId::new("a")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut registry = Registry::new();
        registry.insert(SourceId::new("a"));
        assert!(!registry.remove("b"));
        assert!(registry.contains("a"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clear_reports_count() {
        let mut registry = Registry::new();
        registry.insert(SourceId::new("a"));
        registry.insert(SourceId::new("b"));
        assert_eq!(registry.clear(), 2);
        assert!(registry.is_empty());
        assert_eq!(registry.clear(), 0);
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let mut registry = Registry::new();
        registry.insert(SourceId::new("nav-2"));
        registry.insert(SourceId::new("generic"));
        registry.insert(SourceId::new("nav-1"));
        let names: Vec<String> = registry.snapshot().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["generic", "nav-1", "nav-2"]);
    }
}
