// File: src/config.rs
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Runtime settings. Loaded from an optional JSON file, then overridden by
/// `MARKOV_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory of the message store.
    pub data_dir: PathBuf,
    /// Edges counted above this value add to the complexity score.
    pub use_threshold: i64,
    /// Reply rate for communities with no saved rate.
    pub default_reply_rate: u32,
    /// Upper bound on a single link check.
    pub validation_timeout_ms: u64,
    /// `talk` output is re-encoded with probability 1/odds. 0 disables it.
    pub hieroglyph_odds: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            use_threshold: 5,
            default_reply_rate: 10,
            validation_timeout_ms: 5_000,
            hieroglyph_odds: 200,
        }
    }
}

impl Config {
    /// Reads `path` if given, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Applies overrides from any key lookup; the environment in production.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("MARKOV_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(v) = lookup("MARKOV_USE_THRESHOLD") {
            self.use_threshold = parse("MARKOV_USE_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("MARKOV_REPLY_RATE") {
            self.default_reply_rate = parse("MARKOV_REPLY_RATE", &v)?;
        }
        if let Some(v) = lookup("MARKOV_VALIDATION_TIMEOUT_MS") {
            self.validation_timeout_ms = parse("MARKOV_VALIDATION_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("MARKOV_HIEROGLYPH_ODDS") {
            self.hieroglyph_odds = parse("MARKOV_HIEROGLYPH_ODDS", &v)?;
        }
        Ok(())
    }

    pub fn validation_timeout(&self) -> Duration {
        Duration::from_millis(self.validation_timeout_ms)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
