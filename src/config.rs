//! Configuration for justrun.
//!
//! Everything has a default, so a config file only needs the keys it
//! overrides. Nothing here reads the environment; callers decide where the
//! configuration comes from.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell used by the `*_sh` helpers.
    pub shell: ShellSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Shell configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    /// Path of the shell program.
    pub program: String,
    /// Flag that makes the shell read the next argument as a script.
    pub flag: String,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            program: crate::execution::DEFAULT_SHELL.to_string(),
            flag: crate::execution::DEFAULT_SHELL_FLAG.to_string(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Filter directive for [`crate::logging::try_init_with_filter`].
    pub fn log_filter(&self) -> String {
        format!("justrun={}", self.logging.level)
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error.
    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
}
