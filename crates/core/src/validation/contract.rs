//! Structural lint for loaded contracts
//!
//! Checks that loading cannot enforce on its own: foreign key pointers,
//! regular expressions, bound sanity and primary-key declarations. This is
//! not meta-schema validation.

use crate::models::{Contract, DataType, Field, FieldKind, Model, QualityRule};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// `model.field` or `model.parent.child`
static REFERENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*(\.[A-Za-z_][A-Za-z0-9_\-]*)+$")
        .expect("reference regex is valid")
});

/// Severity of a lint finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    Warning,
    Error,
}

impl fmt::Display for LintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintLevel::Warning => f.write_str("warning"),
            LintLevel::Error => f.write_str("error"),
        }
    }
}

/// One lint finding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintFinding {
    pub level: LintLevel,
    /// Path of the offending node (`models.orders.fields.id`)
    pub path: String,
    pub message: String,
}

impl fmt::Display for LintFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.level, self.path, self.message)
    }
}

/// Result of linting a contract
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContractValidationResult {
    pub findings: Vec<LintFinding>,
}

impl ContractValidationResult {
    pub fn errors(&self) -> impl Iterator<Item = &LintFinding> {
        self.findings.iter().filter(|f| f.level == LintLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LintFinding> {
        self.findings
            .iter()
            .filter(|f| f.level == LintLevel::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Contract linter
#[derive(Debug, Default)]
pub struct ContractValidator;

impl ContractValidator {
    /// Create a new contract validator
    pub fn new() -> Self {
        Self
    }

    /// Run all checks over a contract
    pub fn validate(&self, contract: &Contract) -> ContractValidationResult {
        let mut lint = Lint {
            contract,
            findings: Vec::new(),
        };

        for (i, rule) in contract.quality.iter().enumerate() {
            lint.check_quality(&rule_path("quality", rule, i), rule);
        }
        for model in &contract.models {
            lint.check_model(model);
        }

        for finding in &lint.findings {
            warn!("{}", finding);
        }
        ContractValidationResult {
            findings: lint.findings,
        }
    }
}

struct Lint<'c> {
    contract: &'c Contract,
    findings: Vec<LintFinding>,
}

impl Lint<'_> {
    fn push(&mut self, level: LintLevel, path: &str, message: impl Into<String>) {
        self.findings.push(LintFinding {
            level,
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn check_model(&mut self, model: &Model) {
        let path = format!("models.{}", model.name);

        if model.fields.is_empty() {
            self.push(LintLevel::Warning, &path, "model has no fields");
        }
        if let Some(columns) = &model.primary_key {
            for column in columns {
                if model.get_field(column).is_none() {
                    self.push(
                        LintLevel::Error,
                        &path,
                        format!("primary key column '{}' is not a field of the model", column),
                    );
                }
            }
        }

        for (i, rule) in model.quality.iter().enumerate() {
            self.check_quality(&rule_path(&format!("{}.quality", path), rule, i), rule);
        }
        for field in &model.fields {
            self.check_field(&format!("{}.fields.{}", path, field.name), field);
        }
    }

    fn check_field(&mut self, path: &str, field: &Field) {
        if let Some(reference) = &field.references {
            self.check_reference(path, reference);
        }

        if let FieldKind::Scalar {
            data_type,
            constraints,
        } = &field.kind
        {
            if let Some(pattern) = &constraints.pattern {
                if let Err(e) = Regex::new(pattern) {
                    self.push(
                        LintLevel::Error,
                        path,
                        format!("pattern does not compile: {}", e),
                    );
                }
            }
            if let (Some(min), Some(max)) = (constraints.min_length, constraints.max_length) {
                if min > max {
                    self.push(
                        LintLevel::Error,
                        path,
                        format!("minLength {} exceeds maxLength {}", min, max),
                    );
                }
            }
            if let (Some(min), Some(max)) = (constraints.minimum, constraints.maximum) {
                if min > max {
                    self.push(
                        LintLevel::Error,
                        path,
                        format!("minimum {} exceeds maximum {}", min, max),
                    );
                }
            }
            if constraints.enum_values.as_ref().is_some_and(|v| v.is_empty()) {
                self.push(LintLevel::Warning, path, "enum allows no values");
            }
            let has_length = constraints.min_length.is_some() || constraints.max_length.is_some();
            if has_length && !data_type.is_textual() && !matches!(data_type, DataType::Bytes) {
                self.push(
                    LintLevel::Warning,
                    path,
                    format!("length constraint on non-text type {}", data_type),
                );
            }
        }

        for (i, rule) in field.quality.iter().enumerate() {
            self.check_quality(&rule_path(&format!("{}.quality", path), rule, i), rule);
        }
        for child in field.nested_fields() {
            self.check_field(&format!("{}.fields.{}", path, child.name), child);
        }
    }

    fn check_reference(&mut self, path: &str, reference: &str) {
        if !REFERENCE_REGEX.is_match(reference) {
            self.push(
                LintLevel::Error,
                path,
                format!("reference '{}' is not of the form model.field", reference),
            );
            return;
        }

        let mut segments = reference.split('.');
        let target = segments
            .next()
            .and_then(|model| self.contract.get_model(model))
            .and_then(|model| {
                let first = segments.next()?;
                let field = model.get_field(first)?;
                segments.try_fold(field, |parent, name| {
                    parent.nested_fields().iter().find(|f| f.name == name)
                })
            });
        if target.is_none() {
            self.push(
                LintLevel::Warning,
                path,
                format!("reference '{}' does not resolve within this contract", reference),
            );
        }
    }

    fn check_quality(&mut self, path: &str, rule: &QualityRule) {
        if rule.threshold.is_empty() {
            self.push(LintLevel::Error, path, "threshold admits no value");
        }
    }
}

fn rule_path(scope: &str, rule: &QualityRule, position: usize) -> String {
    match &rule.name {
        Some(name) => format!("{}.{}", scope, name),
        None => format!("{}[{}]", scope, position),
    }
}
