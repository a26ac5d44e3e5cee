//! Output formatting for CLI

use crate::error::CliError;
use clap::ValueEnum;
use datacontract_core::diff::Comparison;
use datacontract_core::{
    ChangeKind, Changelog, ClassifiedChange, ContractValidationResult, Severity, Summary,
};
use serde::Serialize;

/// Rendering of command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Result of the `breaking` command
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateReport<'r, 'a> {
    pub passed: bool,
    pub fail_on: Severity,
    pub summary: Summary,
    pub changes: &'r [ClassifiedChange<'a>],
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn marker(kind: ChangeKind) -> char {
    match kind {
        ChangeKind::Added => '+',
        ChangeKind::Removed => '-',
        ChangeKind::Modified => '~',
    }
}

fn heading(severity: Severity) -> &'static str {
    match severity {
        Severity::Breaking => "Breaking changes",
        Severity::Warning => "Warnings",
        Severity::Info => "Informational changes",
    }
}

/// Format raw diff records, one per line
pub fn format_comparison(comparison: &Comparison<'_>) -> String {
    if comparison.is_empty() {
        return "No differences\n".to_string();
    }

    let mut output = String::new();
    for change in &comparison.changes {
        output.push_str(&format!("{} {} ({})", marker(change.kind), change.path, change.entity));
        if let Some(attribute) = change.attribute {
            output.push_str(&format!(" [{}]", attribute));
        }
        output.push('\n');
    }
    output.push_str(&format!("\n{} difference(s)\n", comparison.changes.len()));
    output
}

/// Format a changelog grouped by severity and path
pub fn format_changelog(changelog: &Changelog<'_>) -> String {
    if changelog.is_empty() {
        return "No changes\n".to_string();
    }

    let mut output = String::new();
    let mut current: Option<Severity> = None;
    for group in changelog.groups() {
        if current != Some(group.severity) {
            let count = group_count(changelog, group.severity);
            output.push_str(&format!("\n{} ({}):\n", heading(group.severity), count));
            current = Some(group.severity);
        }

        output.push_str(&format!("  {} ({})\n", group.path, group.entity));
        for change in &group.changes {
            output.push_str(&format!(
                "    {} {} [{}]\n",
                marker(change.change.kind),
                change.description(),
                change.rule_id()
            ));
        }
    }

    output.push_str(&format!("\n{}\n", format_summary(&changelog.summary())));
    output
}

/// Number of paths whose group lands under the given severity heading
fn group_count(changelog: &Changelog<'_>, severity: Severity) -> usize {
    changelog
        .groups()
        .iter()
        .filter(|g| g.severity == severity)
        .count()
}

pub fn format_summary(summary: &Summary) -> String {
    format!(
        "Summary: {} breaking, {} warning, {} info ({} total)",
        summary.breaking, summary.warning, summary.info, summary.total
    )
}

/// Format the `breaking` command result
pub fn format_gate(report: &GateReport<'_, '_>, changelog: &Changelog<'_>) -> String {
    let mut output = format_changelog(changelog);
    if report.passed {
        output.push_str(&format!("\n✅ No changes at or above '{}'\n", report.fail_on));
    } else {
        output.push_str(&format!("\n❌ Changes at or above '{}' found\n", report.fail_on));
    }
    output
}

/// Format lint findings
pub fn format_lint(location: &str, result: &ContractValidationResult) -> String {
    if result.is_clean() {
        return format!("✅ {}: no problems found\n", location);
    }

    let mut output = String::new();
    for finding in &result.findings {
        output.push_str(&format!("  {}\n", finding));
    }
    output.push_str(&format!(
        "\n{}: {} error(s), {} warning(s)\n",
        location,
        result.errors().count(),
        result.warnings().count()
    ));
    output
}
