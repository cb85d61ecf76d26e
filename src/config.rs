//! Configuration management for knit

use crate::metrics::{MetricName, UnknownMetric};
use crate::usage::Filters;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Default report thresholds
pub mod defaults {
    /// Mean normalized cohesion below which a class is flagged.
    pub const SCORE_THRESHOLD: f64 = 0.5;
}

/// Error type for configuration problems. Raised before any decoding
/// starts; a bad configuration fails the whole run.
#[derive(Debug)]
pub enum ConfigError {
    UnknownMetric(UnknownMetric),
    BadToml(String),
    BadValue { key: String },
}

impl From<UnknownMetric> for ConfigError {
    fn from(err: UnknownMetric) -> Self {
        Self::UnknownMetric(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMetric(err) => err.fmt(f),
            Self::BadToml(msg) => write!(f, "config parse error: {msg}"),
            Self::BadValue { key } => write!(f, "config key '{key}' has the wrong type"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Analysis configuration: which metrics to compute, which methods score,
/// per-metric numeric parameters and report thresholds.
#[derive(Debug, Clone)]
pub struct Config {
    /// Metrics to compute, in reporting order.
    pub metrics: Vec<MetricName>,
    pub filters: Filters,
    /// Plain name → value mapping for per-metric numeric parameters.
    pub params: BTreeMap<String, f64>,
    pub score_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metrics: MetricName::ALL.to_vec(),
            filters: Filters::default(),
            params: BTreeMap::new(),
            score_threshold: defaults::SCORE_THRESHOLD,
        }
    }
}

impl Config {
    /// Load config from files, with later files overriding earlier ones.
    /// Loads from: ~/.knitconfig, ./.knitconfig
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(home) = std::env::var_os("HOME") {
            let home_config = Path::new(&home).join(".knitconfig");
            if let Ok(content) = std::fs::read_to_string(&home_config) {
                config.merge_from_toml(&content)?;
            }
        }

        let local_config = Path::new(".knitconfig");
        if let Ok(content) = std::fs::read_to_string(local_config) {
            config.merge_from_toml(&content)?;
        }

        Ok(config)
    }

    /// Load config from a specific file path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        match std::fs::read_to_string(path) {
            Ok(content) => config.merge_from_toml(&content)?,
            Err(_) => {
                eprintln!("Warning: Could not read config file: {}", path.display());
            }
        }
        Ok(config)
    }

    /// Validates a list of metric names against the recognized set.
    pub fn parse_metrics(names: &[String]) -> Result<Vec<MetricName>, ConfigError> {
        names
            .iter()
            .map(|name| name.parse::<MetricName>().map_err(ConfigError::from))
            .collect()
    }

    /// Merge values from a TOML string into this config.
    fn merge_from_toml(&mut self, content: &str) -> Result<(), ConfigError> {
        let table: toml::Table = content
            .parse()
            .map_err(|err: toml::de::Error| ConfigError::BadToml(err.to_string()))?;

        if let Some(metrics) = table.get("metrics").and_then(|v| v.as_table())
            && let Some(enabled) = metrics.get("enabled")
        {
            let names = enabled
                .as_array()
                .ok_or(ConfigError::BadValue {
                    key: "metrics.enabled".to_string(),
                })?
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or(ConfigError::BadValue {
                        key: "metrics.enabled".to_string(),
                    })
                })
                .collect::<Result<Vec<String>, ConfigError>>()?;
            self.metrics = Self::parse_metrics(&names)?;
        }

        if let Some(filters) = table.get("filters").and_then(|v| v.as_table()) {
            apply_flag(filters, "include_ctors", &mut self.filters.include_ctors)?;
            apply_flag(filters, "include_statics", &mut self.filters.include_statics)?;
            apply_flag(filters, "include_private", &mut self.filters.include_private)?;
            apply_flag(filters, "include_bridges", &mut self.filters.include_bridges)?;
        }

        if let Some(params) = table.get("params").and_then(|v| v.as_table()) {
            for (key, value) in params {
                let value = as_f64(value).ok_or_else(|| ConfigError::BadValue {
                    key: format!("params.{key}"),
                })?;
                self.params.insert(key.clone(), value);
            }
        }

        if let Some(report) = table.get("report").and_then(|v| v.as_table())
            && let Some(value) = report.get("score_threshold")
        {
            self.score_threshold = as_f64(value).ok_or(ConfigError::BadValue {
                key: "report.score_threshold".to_string(),
            })?;
        }

        Ok(())
    }
}

fn apply_flag(table: &toml::Table, key: &str, flag: &mut bool) -> Result<(), ConfigError> {
    match table.get(key) {
        None => Ok(()),
        Some(value) => {
            *flag = value.as_bool().ok_or_else(|| ConfigError::BadValue {
                key: format!("filters.{key}"),
            })?;
            Ok(())
        }
    }
}

fn as_f64(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        _ => None,
    }
}
