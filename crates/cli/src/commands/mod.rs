//! CLI command implementations

pub mod breaking;
pub mod changelog;
pub mod diff;
pub mod lint;

use crate::output::OutputFormat;

/// Outcome of a command that ran to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed,
    /// The gate or lint check failed
    Failed,
}

/// Arguments for commands comparing two contract versions
pub struct CompareArgs {
    /// Path or URL of the previous version
    pub old: String,
    /// Path or URL of the new version
    pub new: String,
    pub format: OutputFormat,
}

/// Arguments for the `lint` command
pub struct LintArgs {
    /// Path or URL of the contract
    pub location: String,
    pub format: OutputFormat,
}
