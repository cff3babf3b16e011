//! Engine configuration: selection pattern and debug tracing.
//!
//! The selection pattern restricts which scopes execute assertions. It is
//! supplied out-of-band (environment variable or a TOML file) and
//! compiled exactly once, at engine construction — no hidden global.

use crate::errors::{SpecError, SpecResult};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Environment variable holding the selection pattern.
pub const PATTERN_ENV: &str = "MINISPEC_PATTERN";

/// Configuration for a [`crate::SpecTest`] engine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecConfig {
    /// Regex matched against the space-joined scope path. `None` runs
    /// everything.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Trace hook firing through the reporter.
    #[serde(default)]
    pub debug: bool,
}

impl SpecConfig {
    /// Read the selection pattern from the environment.
    pub fn from_env() -> Self {
        SpecConfig {
            pattern: std::env::var(PATTERN_ENV).ok().filter(|p| !p.is_empty()),
            debug: false,
        }
    }

    /// Use an explicit selection pattern.
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        SpecConfig {
            pattern: Some(pattern.into()),
            debug: false,
        }
    }

    /// Load from a TOML file. A missing file is the default config.
    pub fn load(path: &Path) -> SpecResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SpecError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SpecError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Compile the selection pattern, once.
    pub fn compile(&self) -> SpecResult<Option<Regex>> {
        match &self.pattern {
            None => Ok(None),
            Some(pattern) => Regex::new(pattern).map(Some).map_err(|e| SpecError::Pattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            }),
        }
    }
}
