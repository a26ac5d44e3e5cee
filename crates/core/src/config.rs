//! Configuration for loading and classifying contracts
//!
//! Settings are read from a TOML file:
//!
//! ```toml
//! [changelog]
//! fail_on = "breaking"
//!
//! [changelog.severity_overrides]
//! "quality-removed" = "breaking"
//!
//! [loader]
//! inline_definitions = true
//! inline_quality = true
//! http_timeout_secs = 10
//! ```

use crate::diff::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while reading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has unexpected keys
    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub changelog: ChangelogConfig,
    pub loader: LoaderConfig,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Configuration for change classification and the breaking gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChangelogConfig {
    /// The gate fails when any change has at least this severity
    pub fail_on: Severity,

    /// Severity per rule id, replacing the built-in severity
    pub severity_overrides: BTreeMap<String, Severity>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            fail_on: Severity::Breaking,
            severity_overrides: BTreeMap::new(),
        }
    }
}

impl ChangelogConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> ChangelogConfigBuilder {
        ChangelogConfigBuilder::default()
    }

    /// Severity override for a rule, if configured
    pub fn override_for(&self, rule_id: &str) -> Option<Severity> {
        self.severity_overrides.get(rule_id).copied()
    }
}

/// Builder for ChangelogConfig
#[derive(Debug, Default)]
pub struct ChangelogConfigBuilder {
    config: ChangelogConfig,
}

impl ChangelogConfigBuilder {
    /// Set the gate threshold
    pub fn fail_on(mut self, severity: Severity) -> Self {
        self.config.fail_on = severity;
        self
    }

    /// Override the severity of one rule
    pub fn severity_override(mut self, rule_id: impl Into<String>, severity: Severity) -> Self {
        self.config
            .severity_overrides
            .insert(rule_id.into(), severity);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ChangelogConfig {
        self.config
    }
}

/// Configuration for document loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Replace `$ref` pointers with the referenced definitions
    pub inline_definitions: bool,

    /// Replace `$ref` quality specifications with the referenced check files
    pub inline_quality: bool,

    /// Timeout for fetching remote documents
    pub http_timeout_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            inline_definitions: true,
            inline_quality: true,
            http_timeout_secs: 10,
        }
    }
}

impl LoaderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable definition inlining
    pub fn with_inline_definitions(mut self, inline: bool) -> Self {
        self.inline_definitions = inline;
        self
    }

    /// Enable or disable inlining of referenced quality specifications
    pub fn with_inline_quality(mut self, inline: bool) -> Self {
        self.inline_quality = inline;
        self
    }

    /// Set the http timeout in seconds
    pub fn with_http_timeout_secs(mut self, secs: u64) -> Self {
        self.http_timeout_secs = secs;
        self
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
