//! Configuration system for retain.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RetainError, RetainResult};
use crate::scheduling::ScheduleParams;

/// Main retain configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetainConfig {
    /// Path to the SQLite question database.
    pub database_path: PathBuf,
    /// Directories scanned for markdown question files.
    pub question_dirs: Vec<PathBuf>,
    /// Extra attempts a review makes after losing a concurrent update race.
    pub max_conflict_retries: u32,
    /// Scheduling parameters.
    pub schedule: ScheduleParams,
}

impl Default for RetainConfig {
    fn default() -> Self {
        let retain_dir = dirs::home_dir()
            .map(|h| h.join(".retain"))
            .unwrap_or_else(|| PathBuf::from(".retain"));

        Self {
            database_path: retain_dir.join("retain.db"),
            question_dirs: vec![PathBuf::from("questions")],
            max_conflict_retries: 3,
            schedule: ScheduleParams::default(),
        }
    }
}

impl RetainConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> RetainResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| RetainError::Configuration(e.to_string()))?
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| RetainError::Configuration(e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| RetainError::Configuration(e.to_string()))?,
            _ => {
                return Err(RetainError::Configuration(
                    "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables over the defaults.
    pub fn from_env() -> RetainResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Overlay `RETAIN_*` environment variables onto this configuration.
    pub fn with_env_overrides(self) -> RetainResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> RetainResult<Self> {
        if let Some(path) = var("RETAIN_DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }

        if let Some(dirs) = var("RETAIN_QUESTION_DIRS") {
            let dirs: Vec<PathBuf> = dirs
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(PathBuf::from)
                .collect();
            if !dirs.is_empty() {
                self.question_dirs = dirs;
            }
        }

        if let Some(retries) = var("RETAIN_MAX_CONFLICT_RETRIES") {
            self.max_conflict_retries = retries.trim().parse().map_err(|_| {
                RetainError::Configuration(format!(
                    "RETAIN_MAX_CONFLICT_RETRIES must be a non-negative integer, got '{}'",
                    retries
                ))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> RetainResult<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(RetainError::Configuration(
                "database_path must not be empty".to_string(),
            ));
        }
        self.schedule.validate()
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> RetainConfigBuilder {
        RetainConfigBuilder::default()
    }
}

/// Builder for RetainConfig.
#[derive(Default)]
pub struct RetainConfigBuilder {
    config: RetainConfig,
}

impl RetainConfigBuilder {
    /// Set the database path.
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database_path = path.into();
        self
    }

    /// Replace the question directories.
    pub fn question_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config.question_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn max_conflict_retries(mut self, retries: u32) -> Self {
        self.config.max_conflict_retries = retries;
        self
    }

    /// Set scheduling parameters.
    pub fn schedule(mut self, params: ScheduleParams) -> Self {
        self.config.schedule = params;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> RetainResult<RetainConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
