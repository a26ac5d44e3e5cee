//! CLI error type

use datacontract_core::{ConfigError, LoadError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to load contract {location}: {error}")]
    Load { location: String, error: LoadError },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read stdin: {0}")]
    Stdin(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}
