// Tue Jan 13 2026 - Alex

use crate::pattern::parser::DEFAULT_SIZE_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub validate_patterns: bool,
    pub size_limit: usize,
    pub pretty_output: bool,
    pub show_progress: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validate_patterns: true,
            size_limit: DEFAULT_SIZE_LIMIT,
            pretty_output: false,
            show_progress: true,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_patterns = validate;
        self
    }

    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    pub fn with_pretty_output(mut self, pretty: bool) -> Self {
        self.pretty_output = pretty;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_log_level(mut self, level: &str) -> Self {
        self.log_level = level.to_string();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_limit == 0 {
            return Err(ConfigError::Invalid("size_limit must be greater than 0".to_string()));
        }
        let known = ["off", "error", "warn", "warning", "info", "debug", "trace"];
        if !known.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!("unknown log level {:?}", self.log_level)));
        }
        Ok(())
    }
}
