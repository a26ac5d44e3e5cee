//! Error types for contract loading

use thiserror::Error;

/// Errors that can occur while loading a contract document
///
/// Load errors are raised before any comparison starts; a document that
/// fails to load never produces change records.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Local file could not be read
    #[error("Failed to read {location}: {message}")]
    Read { location: String, message: String },

    /// Remote resource could not be fetched
    #[error("Failed to fetch {location}: {message}")]
    Fetch { location: String, message: String },

    /// Remote location given without http support compiled in
    #[error("Loading remote location {0} requires the 'http' feature")]
    RemoteUnsupported(String),

    /// Document is not valid YAML or does not match the expected structure
    #[error("Invalid contract document: {0}")]
    Yaml(String),

    /// A name appears twice in the same scope
    #[error("{scope}: duplicate {kind} name '{name}'")]
    DuplicateName {
        scope: String,
        kind: &'static str,
        name: String,
    },

    /// Field type is not part of the supported type set
    #[error("{path}: unknown type '{type_name}'")]
    UnknownType { path: String, type_name: String },

    /// Field has neither a type nor nested fields
    #[error("{path}: missing type")]
    MissingType { path: String },

    /// Field mixes nested fields with scalar constraints
    #[error("{path}: {reason}")]
    ConflictingShape { path: String, reason: String },

    /// `$ref` that could not be resolved
    #[error("{path}: cannot resolve reference '{reference}'")]
    UnresolvedReference { path: String, reference: String },

    /// Local reference in a document loaded without a location
    #[error("Cannot resolve local reference '{0}' without a document location")]
    UnanchoredReference(String),

    /// Library quality rule with an unknown or missing metric
    #[error("{path}: unknown quality metric '{metric}'")]
    UnknownQualityMetric { path: String, metric: String },

    /// Threshold keywords that cannot be interpreted
    #[error("{path}: invalid threshold: {reason}")]
    InvalidThreshold { path: String, reason: String },
}

impl From<serde_yaml::Error> for LoadError {
    fn from(e: serde_yaml::Error) -> Self {
        LoadError::Yaml(e.to_string())
    }
}
