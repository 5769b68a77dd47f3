//! Configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::events::DEFAULT_CHANNEL_CAPACITY;

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".loadcoord.yml";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trigger timing policy
    pub loading: LoadingConfig,

    /// Event bus and event log
    pub events: EventsConfig,
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// An explicit path must load. Otherwise `./.loadcoord.yml`, then
    /// `~/.config/loadcoord/loadcoord.yml`, then defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("loadcoord").join("loadcoord.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}

/// Timing policy for the built-in triggers
///
/// These values shape how long the indicator lingers; nothing in the store
/// depends on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// How long a route-change source stays registered
    #[serde(rename = "route-change-delay-ms")]
    pub route_change_delay_ms: u64,

    /// How long the first-paint source stays registered (0 = same tick)
    #[serde(rename = "initial-load-delay-ms")]
    pub initial_load_delay_ms: u64,

    /// How long a programmatic navigation source stays registered
    #[serde(rename = "navigation-delay-ms")]
    pub navigation_delay_ms: u64,

    /// Reset the viewport on every real route change
    #[serde(rename = "scroll-on-route-change")]
    pub scroll_on_route_change: bool,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            route_change_delay_ms: 800,
            initial_load_delay_ms: 0,
            navigation_delay_ms: 800,
            scroll_on_route_change: true,
        }
    }
}

impl LoadingConfig {
    pub fn route_change_delay(&self) -> Duration {
        Duration::from_millis(self.route_change_delay_ms)
    }

    pub fn initial_load_delay(&self) -> Duration {
        Duration::from_millis(self.initial_load_delay_ms)
    }

    pub fn navigation_delay(&self) -> Duration {
        debug!(navigation_delay_ms = self.navigation_delay_ms, "LoadingConfig::navigation_delay: called");
        Duration::from_millis(self.navigation_delay_ms)
    }
}

/// Event bus and event log settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast buffer size
    pub capacity: usize,

    /// Append every event to this JSONL file
    #[serde(rename = "log-path")]
    pub log_path: Option<PathBuf>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
            log_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.loading.route_change_delay(), Duration::from_millis(800));
        assert_eq!(config.loading.navigation_delay(), Duration::from_millis(800));
        assert!(config.loading.initial_load_delay().is_zero());
        assert!(config.loading.scroll_on_route_change);
        assert_eq!(config.events.capacity, DEFAULT_CHANNEL_CAPACITY);
        assert!(config.events.log_path.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
loading:
  route-change-delay-ms: 250
events:
  log-path: /tmp/loading.jsonl
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.loading.route_change_delay_ms, 250);
        assert_eq!(config.loading.navigation_delay_ms, 800);
        assert_eq!(config.events.capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.events.log_path, Some(PathBuf::from("/tmp/loading.jsonl")));
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("custom.yml");
        fs::write(&path, "loading:\n  scroll-on-route-change: false\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(!config.loading.scroll_on_route_change);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing.yml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("missing.yml"));
    }

    #[test]
    fn test_yaml_uses_kebab_keys() {
        let yaml = Config::default().to_yaml().unwrap();
        assert!(yaml.contains("route-change-delay-ms: 800"));
        assert!(yaml.contains("scroll-on-route-change: true"));
    }
}
