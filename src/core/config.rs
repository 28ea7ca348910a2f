//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::classify::ErrorThresholds;
use crate::core::project::Project;

/// Machine used when nothing else is configured
pub const DEFAULT_MACHINE_ID: &str = "CNC_01";

/// Operator used when nothing else is configured
pub const DEFAULT_OPERATOR: &str = "Operator";

/// Ballbar toolkit configuration with layered hierarchy
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Machine collected by `bbt run` and default for `bbt collect`
    pub machine_id: Option<String>,

    /// Operator recorded on collected measurements
    pub operator: Option<String>,

    /// Deviation class thresholds
    pub thresholds: Option<ThresholdConfig>,

    /// Mean deviation limit for feed-rate advice (mm)
    pub max_allowed_dev: Option<f64>,

    /// Number of measurement rows embedded in the HTML report
    pub sample_rows: Option<usize>,
}

/// Partial threshold override; unset fields keep their defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub small_dev: Option<f64>,
    pub medium_dev: Option<f64>,
}

impl Config {
    /// Load configuration for a known project (or none), merging all
    /// sources in priority order
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (accessor fallbacks)

        // 2. Global user config (~/.config/bbt/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.bbt/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.bbt_dir().join("config.yaml")) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(operator) = std::env::var("BBT_OPERATOR") {
            config.operator = Some(operator);
        }
        if let Ok(machine) = std::env::var("BBT_MACHINE") {
            config.machine_id = Some(machine);
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "bbt")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.machine_id.is_some() {
            self.machine_id = other.machine_id;
        }
        if other.operator.is_some() {
            self.operator = other.operator;
        }
        if let Some(other_thresholds) = other.thresholds {
            let thresholds = self.thresholds.get_or_insert_with(ThresholdConfig::default);
            if other_thresholds.small_dev.is_some() {
                thresholds.small_dev = other_thresholds.small_dev;
            }
            if other_thresholds.medium_dev.is_some() {
                thresholds.medium_dev = other_thresholds.medium_dev;
            }
        }
        if other.max_allowed_dev.is_some() {
            self.max_allowed_dev = other.max_allowed_dev;
        }
        if other.sample_rows.is_some() {
            self.sample_rows = other.sample_rows;
        }
    }

    pub fn machine_id(&self) -> String {
        self.machine_id
            .clone()
            .unwrap_or_else(|| DEFAULT_MACHINE_ID.to_string())
    }

    pub fn operator(&self) -> String {
        self.operator
            .clone()
            .unwrap_or_else(|| DEFAULT_OPERATOR.to_string())
    }

    /// Effective classification thresholds (not yet validated)
    pub fn thresholds(&self) -> ErrorThresholds {
        let defaults = ErrorThresholds::default();
        match &self.thresholds {
            Some(t) => ErrorThresholds {
                small_dev: t.small_dev.unwrap_or(defaults.small_dev),
                medium_dev: t.medium_dev.unwrap_or(defaults.medium_dev),
            },
            None => defaults,
        }
    }

    pub fn max_allowed_dev(&self) -> f64 {
        self.max_allowed_dev
            .unwrap_or(crate::core::advisor::DEFAULT_MAX_ALLOWED_DEV)
    }

    pub fn sample_rows(&self) -> usize {
        self.sample_rows
            .unwrap_or(crate::report::DEFAULT_SAMPLE_ROWS)
    }
}
