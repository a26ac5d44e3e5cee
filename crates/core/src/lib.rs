//! Data Contract Core - comparison and change classification for data contracts
//!
//! Provides unified interfaces for:
//! - Contract loading (YAML from strings, files and http(s) URLs)
//! - Structural comparison of two contract versions
//! - Severity classification and changelog aggregation
//! - Structural lint of a single contract
//! - Configuration (severity overrides, gate threshold, loader settings)

pub mod config;
pub mod diff;
pub mod loader;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{ChangelogConfig, Config, ConfigError, LoaderConfig};
pub use diff::{
    Attribute, Change, ChangeKind, Changelog, ClassifiedChange, Comparison, EntityKind, PathKey,
    Severity, Summary, breaking, changelog, diff,
};
pub use loader::{ContractLoader, LoadError};
pub use validation::{ContractValidationResult, ContractValidator, LintFinding, LintLevel};

// Re-export models
pub use models::{
    Constraints, Contract, DataType, Field, FieldKind, Model, QualityKind, QualityRule, Server,
    ServerType, Threshold,
};
