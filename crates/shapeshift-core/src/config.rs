//! Mapper configuration
//!
//! Settings are loaded from, in increasing precedence:
//! - Default values
//! - A JSON document or file
//! - Environment variables (`SHAPESHIFT_*`)
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Environment variable overriding [`MapperConfig::write_strategy`]
pub const WRITE_STRATEGY_ENV: &str = "SHAPESHIFT_WRITE_STRATEGY";

/// What happens to the target when a call fails halfway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStrategy {
    /// Fields written before the failure keep their new values
    #[default]
    Partial,
    /// Work on a staged copy; the target only changes on success
    Atomic,
}

impl fmt::Display for WriteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStrategy::Partial => f.write_str("partial"),
            WriteStrategy::Atomic => f.write_str("atomic"),
        }
    }
}

impl FromStr for WriteStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "partial" => Ok(WriteStrategy::Partial),
            "atomic" => Ok(WriteStrategy::Atomic),
            other => Err(Error::Configuration {
                message: format!("Unknown write strategy: {}", other),
                source: None,
            }),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Behaviour of failed calls
    pub write_strategy: WriteStrategy,

    /// chrono layouts tried first when parsing text into a timestamp
    pub datetime_layouts: Vec<String>,

    /// Date-only layouts, tried after the datetime layouts; midnight UTC
    pub date_layouts: Vec<String>,

    /// Accept RFC 3339 text once every layout has failed
    pub accept_rfc3339: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            write_strategy: WriteStrategy::Partial,
            datetime_layouts: vec!["%Y-%m-%dT%H:%M:%S%.f".to_string()],
            date_layouts: vec!["%Y-%m-%d".to_string()],
            accept_rfc3339: true,
        }
    }
}

impl MapperConfig {
    /// Parse a JSON document; missing keys take their defaults
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Configuration {
            message: format!("Invalid mapper configuration: {}", e),
            source: Some(e.into()),
        })
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) -> Result<()> {
        if let Ok(strategy) = std::env::var(WRITE_STRATEGY_ENV) {
            self.write_strategy = strategy.parse()?;
        }
        Ok(())
    }

    pub fn with_write_strategy(mut self, strategy: WriteStrategy) -> Self {
        self.write_strategy = strategy;
        self
    }

    /// Fail early on a configuration that can never parse a timestamp
    pub fn validate(&self) -> Result<()> {
        if self.datetime_layouts.is_empty()
            && self.date_layouts.is_empty()
            && !self.accept_rfc3339
        {
            return Err(Error::Configuration {
                message: "No timestamp layout configured".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}
