//! Scripted loading scenarios
//!
//! A scenario is a YAML list of steps replayed against a fresh store, a
//! route tracker following a [`SimulatedRouter`], page triggers and the
//! navigation wrapper. Expectation steps make it a small acceptance test.
//!
//! ```yaml
//! name: week page
//! start: /
//! steps:
//!   - route: /week/12
//!   - page: { id: week-content, loading: true }
//!   - wait-ms: 900
//!   - expect-loading: true
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LoadingConfig;
use crate::host::{NavigateOptions, Navigator, SimulatedRouter};
use crate::store::LoadingStore;
use crate::triggers::{NavigateWithLoading, PageLoading, RouteTracker};

/// Built-in demo scenario
pub const DEMO_SCENARIO: &str = include_str!("../demos/demo.yml");

/// Errors from loading or running a scenario
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Step {step}: expected loading={expected}, found loading={actual}")]
    LoadingMismatch { step: usize, expected: bool, actual: bool },

    #[error("Step {step}: expected {expected} active sources, found {actual} ({sources})")]
    SourceCountMismatch {
        step: usize,
        expected: usize,
        actual: usize,
        sources: String,
    },

    #[error("Step {step}: no mounted page '{id}'")]
    UnknownPage { step: usize, id: String },
}

/// One scripted action or check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    /// The location changes without the navigation wrapper (link, back button)
    Route(String),
    /// Programmatic navigation through the wrapper
    Navigate(String),
    /// Make the router refuse a path
    Reject(String),
    Add(String),
    Remove(String),
    SetLoading(bool),
    /// Mount (if needed) and update a page trigger
    Page { id: String, loading: bool },
    UnmountPage(String),
    WaitMs(u64),
    ExpectLoading(bool),
    ExpectSources(usize),
    Dispose,
}

/// A named list of steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,

    /// Location at mount time
    #[serde(default = "default_start")]
    pub start: String,

    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

fn default_start() -> String {
    "/".to_string()
}

impl Scenario {
    pub fn from_yaml(yaml: &str) -> Result<Self, ScenarioError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        debug!(?path, "Scenario::load: called");
        let content = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// The embedded demo
    pub fn demo() -> Result<Self, ScenarioError> {
        Self::from_yaml(DEMO_SCENARIO)
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub steps: usize,
    pub route_changes: usize,
    pub navigation_failures: Vec<String>,
    pub loading_at_end: bool,
}

/// Replays scenarios against one store
pub struct ScenarioRunner {
    store: LoadingStore,
    router: Arc<SimulatedRouter>,
    tracker: RouteTracker,
    navigate: NavigateWithLoading,
    pages: HashMap<String, PageLoading>,
}

impl ScenarioRunner {
    /// Mount the triggers at `start`
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(store: LoadingStore, config: &LoadingConfig, start: &str) -> Self {
        debug!(%start, "ScenarioRunner::new: called");
        let router = Arc::new(SimulatedRouter::new(start));
        let mut tracker = RouteTracker::new(store.clone(), config).with_viewport(router.clone());
        tracker.observe(start);

        let navigate = NavigateWithLoading::new(
            store.clone(),
            router.clone(),
            router.clone(),
            config.navigation_delay(),
        );

        Self {
            store,
            router,
            tracker,
            navigate,
            pages: HashMap::new(),
        }
    }

    pub fn router(&self) -> &SimulatedRouter {
        &self.router
    }

    /// Run every step in order, stopping at the first failed expectation
    pub async fn run(&mut self, scenario: &Scenario) -> Result<ScenarioReport, ScenarioError> {
        info!(name = %scenario.name, steps = scenario.steps.len(), "Running scenario");
        let mut report = ScenarioReport {
            name: scenario.name.clone(),
            ..Default::default()
        };

        for (index, step) in scenario.steps.iter().enumerate() {
            let number = index + 1;
            debug!(step = number, ?step, "ScenarioRunner: step");
            self.apply(number, step, &mut report).await?;
            report.steps = number;
        }

        report.loading_at_end = self.store.is_loading();
        Ok(report)
    }

    async fn apply(&mut self, step: usize, action: &Step, report: &mut ScenarioReport) -> Result<(), ScenarioError> {
        match action {
            Step::Route(path) => {
                if let Err(e) = self.router.navigate(path, &NavigateOptions::default()) {
                    warn!(step, error = %e, "Route step failed");
                    report.navigation_failures.push(e.to_string());
                }
                self.follow_location(report);
            }
            Step::Navigate(path) => {
                if let Err(e) = self.navigate.navigate(path, &NavigateOptions::default()) {
                    warn!(step, error = %e, "Navigate step failed");
                    report.navigation_failures.push(e.to_string());
                }
                self.follow_location(report);
            }
            Step::Reject(path) => self.router.reject(path.clone()),
            Step::Add(id) => self.store.add_source(id.as_str()),
            Step::Remove(id) => self.store.remove_source(id),
            Step::SetLoading(flag) => self.store.set_loading(*flag),
            Step::Page { id, loading } => {
                let store = &self.store;
                self.pages
                    .entry(id.clone())
                    .or_insert_with(|| PageLoading::with_id(store.clone(), id.as_str()))
                    .update(*loading);
            }
            Step::UnmountPage(id) => {
                if self.pages.remove(id).is_none() {
                    return Err(ScenarioError::UnknownPage { step, id: id.clone() });
                }
            }
            Step::WaitMs(ms) => tokio::time::sleep(Duration::from_millis(*ms)).await,
            Step::ExpectLoading(expected) => {
                let actual = self.store.is_loading();
                if actual != *expected {
                    return Err(ScenarioError::LoadingMismatch {
                        step,
                        expected: *expected,
                        actual,
                    });
                }
            }
            Step::ExpectSources(expected) => {
                let sources = self.store.active_sources();
                if sources.len() != *expected {
                    return Err(ScenarioError::SourceCountMismatch {
                        step,
                        expected: *expected,
                        actual: sources.len(),
                        sources: sources.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", "),
                    });
                }
            }
            Step::Dispose => self.store.dispose(),
        }
        Ok(())
    }

    fn follow_location(&mut self, report: &mut ScenarioReport) {
        let location = self.router.location();
        if self.tracker.observe(&location) {
            report.route_changes += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(store: &LoadingStore) -> ScenarioRunner {
        ScenarioRunner::new(store.clone(), &LoadingConfig::default(), "/")
    }

    #[test]
    fn test_parse_steps() {
        let yaml = r#"
name: parse
steps:
  - route: /a
  - navigate: /b
  - add: nav-1
  - set-loading: true
  - page: { id: recipes, loading: true }
  - unmount-page: recipes
  - wait-ms: 800
  - expect-loading: false
  - expect-sources: 0
  - dispose
"#;
        let scenario = Scenario::from_yaml(yaml).unwrap();
        assert_eq!(scenario.start, "/");
        assert_eq!(scenario.steps.len(), 10);
        assert_eq!(scenario.steps[0], Step::Route("/a".to_string()));
        assert_eq!(
            scenario.steps[4],
            Step::Page {
                id: "recipes".to_string(),
                loading: true
            }
        );
        assert_eq!(scenario.steps[9], Step::Dispose);
    }

    #[test]
    fn test_unknown_step_fails_to_parse() {
        let err = Scenario::from_yaml("steps:\n  - teleport: /x\n").unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[test]
    fn test_demo_parses() {
        let demo = Scenario::demo().unwrap();
        assert!(!demo.steps.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_passes() {
        let store = LoadingStore::new();
        let demo = Scenario::demo().unwrap();
        let mut runner = ScenarioRunner::new(store.clone(), &LoadingConfig::default(), &demo.start);
        let report = runner.run(&demo).await.unwrap();
        assert_eq!(report.steps, demo.steps.len());
        assert!(!report.loading_at_end);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expectation_failure_reports_step() {
        let store = LoadingStore::new();
        let scenario = Scenario::from_yaml("steps:\n  - wait-ms: 900\n  - expect-loading: true\n").unwrap();
        let err = runner(&store).run(&scenario).await.unwrap_err();
        match err {
            ScenarioError::LoadingMismatch { step, expected, actual } => {
                assert_eq!(step, 2);
                assert!(expected);
                assert!(!actual);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_route_is_not_a_change() {
        let store = LoadingStore::new();
        let scenario = Scenario::from_yaml(
            "steps:\n  - wait-ms: 900\n  - route: /a\n  - wait-ms: 900\n  - route: /a\n  - expect-loading: false\n",
        )
        .unwrap();
        let mut runner = runner(&store);
        let report = runner.run(&scenario).await.unwrap();
        assert_eq!(report.route_changes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_navigation_is_recorded() {
        let store = LoadingStore::new();
        let scenario = Scenario::from_yaml(
            "steps:\n  - reject: /admin\n  - navigate: /admin\n  - expect-sources: 2\n  - wait-ms: 900\n  - expect-loading: false\n",
        )
        .unwrap();
        let mut runner = runner(&store);
        let report = runner.run(&scenario).await.unwrap();
        assert_eq!(report.navigation_failures.len(), 1);
        assert_eq!(report.route_changes, 0);
        assert_eq!(runner.router().location(), "/");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_unknown_page() {
        let store = LoadingStore::new();
        let scenario = Scenario::from_yaml("steps:\n  - unmount-page: ghost\n").unwrap();
        let err = runner(&store).run(&scenario).await.unwrap_err();
        assert!(matches!(err, ScenarioError::UnknownPage { step: 1, .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Scenario::load("/definitely/not/here.yml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yml"));
    }
}
