//! Breaking change check

use super::{CompareArgs, Status};
use crate::error::CliError;
use crate::output::{self, GateReport, OutputFormat};
use crate::source::load_pair;
use datacontract_core::{Config, ContractLoader, Severity, diff};
use tracing::info;

/// Handle the `breaking` command
///
/// Prints changes of severity warning and above. The gate is evaluated on
/// the full changelog so a `fail_on = "info"` setting still sees info
/// records.
pub fn handle_breaking(
    loader: &ContractLoader,
    config: &Config,
    args: &CompareArgs,
) -> Result<Status, CliError> {
    let (old, new) = load_pair(loader, &args.old, &args.new)?;
    let full = diff::changelog(&old, &new, &config.changelog);
    let fail_on = config.changelog.fail_on;
    let passed = full.passes(fail_on);

    let changelog = full.filter(Severity::Warning);
    let report = GateReport {
        passed,
        fail_on,
        summary: changelog.summary(),
        changes: changelog.all_changes(),
    };

    match args.format {
        OutputFormat::Json => println!("{}", output::to_json(&report)?),
        OutputFormat::Text => print!("{}", output::format_gate(&report, &changelog)),
    }

    info!(
        "Breaking check {} (fail_on={}, {} change(s) reported)",
        if passed { "passed" } else { "failed" },
        fail_on,
        changelog.len()
    );
    Ok(if passed { Status::Passed } else { Status::Failed })
}
