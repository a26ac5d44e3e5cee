//! Lint command implementation

use super::{LintArgs, Status};
use crate::error::CliError;
use crate::output::{self, OutputFormat};
use crate::source::load_contract;
use datacontract_core::{ContractLoader, ContractValidator};

/// Handle the `lint` command
pub fn handle_lint(loader: &ContractLoader, args: &LintArgs) -> Result<Status, CliError> {
    let contract = load_contract(loader, &args.location)?;
    let result = ContractValidator::new().validate(&contract);

    match args.format {
        OutputFormat::Json => println!("{}", output::to_json(&result)?),
        OutputFormat::Text => print!("{}", output::format_lint(&args.location, &result)),
    }
    Ok(if result.has_errors() {
        Status::Failed
    } else {
        Status::Passed
    })
}
