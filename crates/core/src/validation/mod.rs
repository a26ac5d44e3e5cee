//! Validation functionality
//!
//! Provides structural lint for loaded contracts:
//! - Foreign key pointer format and resolution
//! - Pattern compilation and bound sanity
//! - Primary key declarations and quality thresholds

pub mod contract;

pub use contract::{ContractValidationResult, ContractValidator, LintFinding, LintLevel};
