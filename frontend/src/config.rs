//! # Planner Configuration
//!
//! Client settings live in an optional YAML file and can be overridden from
//! the environment.
//!
//! ```yaml
//! api_base_url: "http://localhost:5000/api"
//! search_debounce_ms: 500
//! log_filter: "info"
//! request_timeout_secs: 30
//! ```
//!
//! Environment overrides: `TRIP_PLANNER_API_URL`, `TRIP_PLANNER_LOG`,
//! `TRIP_PLANNER_DEBOUNCE_MS`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub const API_URL_ENV: &str = "TRIP_PLANNER_API_URL";
pub const LOG_FILTER_ENV: &str = "TRIP_PLANNER_LOG";
pub const DEBOUNCE_ENV: &str = "TRIP_PLANNER_DEBOUNCE_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Base URL every API path is appended to
    pub api_base_url: String,
    /// Quiet period before a typed search query is evaluated
    pub search_debounce_ms: u64,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Per-request timeout. `None` leaves the HTTP client's default in place.
    pub request_timeout_secs: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            search_debounce_ms: 500,
            log_filter: "info".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl PlannerConfig {
    /// Load configuration from an optional YAML file, then apply environment
    /// overrides. A path that does not exist yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let yaml_content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {:?}", path))?;
                let config: PlannerConfig = serde_yaml::from_str(&yaml_content)
                    .with_context(|| format!("Failed to parse config file {:?}", path))?;
                info!("Loaded planner config from {:?}", path);
                config
            }
            Some(path) => {
                debug!("No config file at {:?}, using defaults", path);
                PlannerConfig::default()
            }
            None => PlannerConfig::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// production, a map in tests)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            self.api_base_url = url;
        }
        if let Some(filter) = lookup(LOG_FILTER_ENV) {
            self.log_filter = filter;
        }
        if let Some(raw) = lookup(DEBOUNCE_ENV) {
            self.search_debounce_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of milliseconds", DEBOUNCE_ENV))?;
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}
