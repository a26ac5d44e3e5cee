//! datacontract - changelogs and breaking change checks for data contracts
//!
//! Usage:
//!     datacontract changelog v1/datacontract.yaml v2/datacontract.yaml
//!     datacontract breaking v1.yaml v2.yaml --format json --config datacontract.toml

mod commands;
mod error;
mod logging;
mod output;
mod source;

use clap::{Args, Parser, Subcommand};
use commands::{CompareArgs, LintArgs, Status};
use datacontract_core::{Config, ContractLoader, Severity};
use error::CliError;
use output::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "datacontract",
    version,
    about = "Compare data contract versions and classify their changes"
)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show raw structural differences
    Diff(CompareCommand),
    /// Show the classified changelog, most severe changes first
    Changelog(CompareCommand),
    /// Show changes affecting consumers and fail when the gate is reached
    Breaking {
        #[command(flatten)]
        compare: CompareCommand,

        /// Lowest severity that fails the check (overrides the config file)
        #[arg(long)]
        fail_on: Option<Severity>,
    },
    /// Check a single contract for structural problems
    Lint {
        /// Path or URL of the contract ("-" for stdin)
        location: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Args, Debug)]
struct CompareCommand {
    /// Path or URL of the previous version ("-" for stdin)
    old: String,

    /// Path or URL of the new version ("-" for stdin)
    new: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl CompareCommand {
    fn into_args(self) -> CompareArgs {
        CompareArgs {
            old: self.old,
            new: self.new,
            format: self.format,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(Status::Passed) => ExitCode::SUCCESS,
        Ok(Status::Failed) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<Status> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path).map_err(CliError::from)?,
        None => Config::default(),
    };
    let loader = ContractLoader::new(config.loader.clone());

    let status = match cli.command {
        Command::Diff(compare) => commands::diff::handle_diff(&loader, &compare.into_args())?,
        Command::Changelog(compare) => {
            commands::changelog::handle_changelog(&loader, &config, &compare.into_args())?
        }
        Command::Breaking { compare, fail_on } => {
            if let Some(fail_on) = fail_on {
                config.changelog.fail_on = fail_on;
            }
            commands::breaking::handle_breaking(&loader, &config, &compare.into_args())?
        }
        Command::Lint { location, format } => {
            commands::lint::handle_lint(&loader, &LintArgs { location, format })?
        }
    };
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_breaking_with_global_options() {
        let cli = Cli::try_parse_from([
            "datacontract",
            "breaking",
            "v1.yaml",
            "v2.yaml",
            "--fail-on",
            "warning",
            "--format",
            "json",
            "--config",
            "dc.toml",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("dc.toml")));
        match cli.command {
            Command::Breaking { compare, fail_on } => {
                assert_eq!(compare.old, "v1.yaml");
                assert_eq!(compare.format, OutputFormat::Json);
                assert_eq!(fail_on, Some(Severity::Warning));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_severity() {
        let result = Cli::try_parse_from([
            "datacontract",
            "breaking",
            "a.yaml",
            "b.yaml",
            "--fail-on",
            "fatal",
        ]);
        assert!(result.is_err());
    }
}
