//! TOML-based application configuration.
//!
//! Stored at `<data dir>/config.toml`. Only engine settings live here; the
//! planner state itself is kept in the JSON snapshot.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::engine::{Settings, DEFAULT_SNAP_MINUTES};
use crate::error::ConfigError;

/// Planner section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Minute increment for placed starts. Must divide 60.
    #[serde(default = "default_snap_minutes")]
    pub snap_minutes: u16,
    /// Week used when a command names none, e.g. "2026-W42". Unset means
    /// the current week.
    #[serde(default)]
    pub default_week: Option<String>,
}

fn default_snap_minutes() -> u16 {
    DEFAULT_SNAP_MINUTES
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            snap_minutes: default_snap_minutes(),
            default_week: None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerConfig,
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed or fails
    /// validation, or if the defaults cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let snap = self.planner.snap_minutes;
        if snap == 0 || snap > 60 || 60 % snap != 0 {
            return Err(ConfigError::InvalidValue {
                key: "planner.snap_minutes".to_string(),
                message: format!("{snap} must be between 1 and 60 and divide 60"),
            });
        }
        if let Some(week) = &self.planner.default_week {
            week.parse::<crate::time::WeekKey>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "planner.default_week".to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Engine settings derived from this config.
    pub fn settings(&self) -> Settings {
        Settings {
            snap_minutes: self.planner.snap_minutes,
        }
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }
        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match Self::get_json_value_by_path(&json, key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => Some(String::new()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving. The result is
    /// validated; on failure `self` is unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut next = self.clone();
        match key {
            "planner.snap_minutes" => {
                next.planner.snap_minutes =
                    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("cannot parse '{value}' as minutes"),
                    })?;
            }
            "planner.default_week" => {
                let value = value.trim();
                next.planner.default_week = (!value.is_empty()).then(|| value.to_string());
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}
