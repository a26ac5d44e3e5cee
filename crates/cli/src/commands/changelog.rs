//! Changelog command implementation

use super::{CompareArgs, Status};
use crate::error::CliError;
use crate::output::{self, OutputFormat};
use crate::source::load_pair;
use datacontract_core::{Config, ContractLoader, diff};

/// Handle the `changelog` command
pub fn handle_changelog(
    loader: &ContractLoader,
    config: &Config,
    args: &CompareArgs,
) -> Result<Status, CliError> {
    let (old, new) = load_pair(loader, &args.old, &args.new)?;
    let changelog = diff::changelog(&old, &new, &config.changelog);

    match args.format {
        OutputFormat::Json => println!("{}", output::to_json(&changelog)?),
        OutputFormat::Text => print!("{}", output::format_changelog(&changelog)),
    }
    Ok(Status::Passed)
}
