//! Diff command implementation

use super::{CompareArgs, Status};
use crate::error::CliError;
use crate::output::{self, OutputFormat};
use crate::source::load_pair;
use datacontract_core::{ContractLoader, diff};

/// Handle the `diff` command
pub fn handle_diff(loader: &ContractLoader, args: &CompareArgs) -> Result<Status, CliError> {
    let (old, new) = load_pair(loader, &args.old, &args.new)?;
    let comparison = diff::diff(&old, &new);

    match args.format {
        OutputFormat::Json => println!("{}", output::to_json(&comparison)?),
        OutputFormat::Text => print!("{}", output::format_comparison(&comparison)),
    }
    Ok(Status::Passed)
}
