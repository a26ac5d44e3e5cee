//! Severity classification of change records
//!
//! Classification is a lookup in a static rule table. Each rule matches on
//! entity kind, change kind, an optional attribute group and an optional
//! predicate over the change. The most specific matching rule wins; among
//! equally specific rules the most severe one wins. Configured overrides
//! replace the severity of a rule by id.

use super::compare::{Attribute, Change, ChangeKind, EntityKind};
use crate::config::ChangelogConfig;
use crate::models::{Compatibility, FieldKind, Relation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Impact of a change on consumers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Severity {
    /// Documentation or metadata only
    #[default]
    Info,
    /// Safe for existing consumers but worth knowing
    Warning,
    /// Requires consumer action
    Breaking,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Breaking => "breaking",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "breaking" => Ok(Severity::Breaking),
            other => Err(format!(
                "unknown severity '{}' (expected info, warning or breaking)",
                other
            )),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Predicate refining a rule match
pub type Predicate = fn(&Change<'_>) -> bool;

/// One row of the classification table
#[derive(Debug)]
pub struct Rule {
    pub id: &'static str,
    pub entity: EntityKind,
    pub change: ChangeKind,
    pub attribute: Option<Attribute>,
    pub predicate: Option<Predicate>,
    pub severity: Severity,
    /// Human readable summary used in changelog descriptions
    pub summary: &'static str,
}

impl Rule {
    fn matches(&self, change: &Change<'_>) -> bool {
        self.entity == change.entity
            && self.change == change.kind
            && self.attribute.is_none_or(|a| Some(a) == change.attribute)
            && self.predicate.is_none_or(|p| p(change))
    }

    fn specificity(&self) -> u8 {
        u8::from(self.attribute.is_some()) * 2 + u8::from(self.predicate.is_some())
    }
}

const fn rule(
    id: &'static str,
    entity: EntityKind,
    change: ChangeKind,
    attribute: Option<Attribute>,
    predicate: Option<Predicate>,
    severity: Severity,
    summary: &'static str,
) -> Rule {
    Rule {
        id,
        entity,
        change,
        attribute,
        predicate,
        severity,
        summary,
    }
}

use Attribute as A;
use ChangeKind::{Added, Modified, Removed};
use EntityKind as E;
use Severity::{Breaking, Info, Warning};

/// The classification table
#[rustfmt::skip]
pub static RULES: &[Rule] = &[
    // models
    rule("model-removed", E::Model, Removed, None, None, Breaking, "Model removed"),
    rule("model-added", E::Model, Added, None, None, Info, "Model added"),
    rule("model-type-changed", E::Model, Modified, Some(A::Type), None, Breaking, "Model type changed"),
    rule("model-primary-key-added", E::Model, Modified, Some(A::PrimaryKey), Some(model_key_added), Warning, "Model primary key declared"),
    rule("model-primary-key-removed", E::Model, Modified, Some(A::PrimaryKey), Some(model_key_removed), Breaking, "Model primary key removed"),
    rule("model-primary-key-changed", E::Model, Modified, Some(A::PrimaryKey), None, Breaking, "Model primary key changed"),
    rule("model-description-changed", E::Model, Modified, Some(A::Description), None, Info, "Model description changed"),
    rule("model-metadata-changed", E::Model, Modified, Some(A::Metadata), None, Info, "Model metadata changed"),
    // fields
    rule("field-removed", E::Field, Removed, None, None, Breaking, "Field removed"),
    rule("field-added-optional", E::Field, Added, None, Some(field_added_optional), Warning, "Optional field added"),
    rule("field-added-required", E::Field, Added, None, Some(field_added_required), Breaking, "Required field added"),
    rule("field-type-widened", E::Field, Modified, Some(A::Type), Some(field_type_widened), Warning, "Field type widened"),
    rule("field-type-changed", E::Field, Modified, Some(A::Type), None, Breaking, "Field type changed"),
    rule("field-required-added", E::Field, Modified, Some(A::Nullability), Some(field_now_required), Breaking, "Field became required"),
    rule("field-required-removed", E::Field, Modified, Some(A::Nullability), Some(field_now_nullable), Warning, "Field became nullable"),
    rule("field-unique-added", E::Field, Modified, Some(A::Uniqueness), Some(field_now_unique), Warning, "Field uniqueness added"),
    rule("field-unique-removed", E::Field, Modified, Some(A::Uniqueness), Some(field_no_longer_unique), Breaking, "Field uniqueness removed"),
    rule("field-primary-key-added", E::Field, Modified, Some(A::PrimaryKey), Some(field_now_primary), Warning, "Field became part of the primary key"),
    rule("field-primary-key-removed", E::Field, Modified, Some(A::PrimaryKey), Some(field_no_longer_primary), Breaking, "Field removed from the primary key"),
    rule("field-constraints-tightened", E::Field, Modified, Some(A::Constraints), Some(constraints_tightened), Warning, "Field constraints tightened"),
    rule("field-constraints-relaxed", E::Field, Modified, Some(A::Constraints), Some(constraints_relaxed), Warning, "Field constraints relaxed"),
    rule("field-constraints-changed", E::Field, Modified, Some(A::Constraints), None, Breaking, "Field constraints changed"),
    rule("field-references-added", E::Field, Modified, Some(A::References), Some(references_added), Warning, "Field reference added"),
    rule("field-references-removed", E::Field, Modified, Some(A::References), Some(references_removed), Warning, "Field reference removed"),
    rule("field-references-changed", E::Field, Modified, Some(A::References), None, Breaking, "Field reference changed"),
    rule("field-default-changed", E::Field, Modified, Some(A::Default), None, Info, "Field default changed"),
    rule("field-description-changed", E::Field, Modified, Some(A::Description), None, Info, "Field description changed"),
    rule("field-metadata-changed", E::Field, Modified, Some(A::Metadata), None, Info, "Field metadata changed"),
    // quality rules
    rule("quality-added", E::QualityRule, Added, None, None, Warning, "Quality rule added"),
    rule("quality-removed", E::QualityRule, Removed, None, None, Warning, "Quality rule removed"),
    rule("quality-threshold-tightened", E::QualityRule, Modified, Some(A::Threshold), Some(threshold_tightened), Warning, "Quality threshold tightened"),
    rule("quality-threshold-relaxed", E::QualityRule, Modified, Some(A::Threshold), Some(threshold_relaxed), Info, "Quality threshold relaxed"),
    rule("quality-threshold-changed", E::QualityRule, Modified, Some(A::Threshold), None, Warning, "Quality threshold changed"),
    rule("quality-type-changed", E::QualityRule, Modified, Some(A::Type), None, Warning, "Quality rule kind changed"),
    rule("quality-parameters-changed", E::QualityRule, Modified, Some(A::Parameters), None, Warning, "Quality rule parameters changed"),
    rule("quality-description-changed", E::QualityRule, Modified, Some(A::Description), None, Info, "Quality rule description changed"),
    // servers
    rule("server-added", E::Server, Added, None, None, Warning, "Server added"),
    rule("server-removed", E::Server, Removed, None, None, Warning, "Server removed"),
    rule("server-changed", E::Server, Modified, Some(A::Type), None, Warning, "Server type changed"),
    rule("server-changed", E::Server, Modified, Some(A::Parameters), None, Warning, "Server configuration changed"),
    rule("server-description-changed", E::Server, Modified, Some(A::Description), None, Info, "Server description changed"),
    // info and terms
    rule("metadata-added", E::Metadata, Added, None, None, Info, "Metadata added"),
    rule("metadata-removed", E::Metadata, Removed, None, None, Info, "Metadata removed"),
    rule("metadata-changed", E::Metadata, Modified, None, None, Info, "Metadata changed"),
];

/// Used when no table row matches; unreachable for changes produced by the
/// comparator
static UNCLASSIFIED: Rule = rule(
    "unclassified",
    E::Metadata,
    Modified,
    None,
    None,
    Warning,
    "Unclassified change",
);

fn model_key_added(change: &Change<'_>) -> bool {
    change
        .old_model()
        .is_some_and(|m| m.primary_key.as_ref().is_none_or(Vec::is_empty))
}

fn model_key_removed(change: &Change<'_>) -> bool {
    change
        .new_model()
        .is_some_and(|m| m.primary_key.as_ref().is_none_or(Vec::is_empty))
}

fn field_added_optional(change: &Change<'_>) -> bool {
    change
        .new_field()
        .is_some_and(|f| f.is_nullable() || f.default.is_some())
}

fn field_added_required(change: &Change<'_>) -> bool {
    !field_added_optional(change)
}

fn field_type_widened(change: &Change<'_>) -> bool {
    match (
        change.old_field().map(|f| &f.kind),
        change.new_field().map(|f| &f.kind),
    ) {
        (
            Some(FieldKind::Scalar { data_type: old, .. }),
            Some(FieldKind::Scalar { data_type: new, .. }),
        ) => old.compatibility(new) == Compatibility::Widened,
        _ => false,
    }
}

fn field_now_required(change: &Change<'_>) -> bool {
    change.new_field().is_some_and(|f| f.required)
}

fn field_now_nullable(change: &Change<'_>) -> bool {
    change.new_field().is_some_and(|f| !f.required)
}

fn field_now_unique(change: &Change<'_>) -> bool {
    change.new_field().is_some_and(|f| f.unique)
}

fn field_no_longer_unique(change: &Change<'_>) -> bool {
    change.new_field().is_some_and(|f| !f.unique)
}

fn field_now_primary(change: &Change<'_>) -> bool {
    change.new_field().is_some_and(|f| f.primary)
}

fn field_no_longer_primary(change: &Change<'_>) -> bool {
    change.new_field().is_some_and(|f| !f.primary)
}

fn constraints_relation(change: &Change<'_>) -> Option<Relation> {
    let old = change.old_field()?.constraints()?;
    let new = change.new_field()?.constraints()?;
    Some(old.relation_to(new))
}

fn constraints_tightened(change: &Change<'_>) -> bool {
    constraints_relation(change) == Some(Relation::Narrower)
}

fn constraints_relaxed(change: &Change<'_>) -> bool {
    constraints_relation(change) == Some(Relation::Wider)
}

fn references_added(change: &Change<'_>) -> bool {
    change.old_field().is_some_and(|f| f.references.is_none())
}

fn references_removed(change: &Change<'_>) -> bool {
    change.new_field().is_some_and(|f| f.references.is_none())
}

fn threshold_relation(change: &Change<'_>) -> Option<Relation> {
    let old = change.old_rule()?;
    let new = change.new_rule()?;
    Some(old.threshold.relation_to(&new.threshold))
}

fn threshold_tightened(change: &Change<'_>) -> bool {
    threshold_relation(change) == Some(Relation::Narrower)
}

fn threshold_relaxed(change: &Change<'_>) -> bool {
    threshold_relation(change) == Some(Relation::Wider)
}

/// A change with its severity and the rule that assigned it
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedChange<'a> {
    pub change: Change<'a>,
    pub severity: Severity,
    pub rule: &'static Rule,
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl ClassifiedChange<'_> {
    pub fn rule_id(&self) -> &'static str {
        self.rule.id
    }

    /// One-line human readable description
    pub fn description(&self) -> String {
        let change = &self.change;
        match change.attribute {
            Some(Attribute::Type) => format!(
                "{} from {} to {}",
                self.rule.summary,
                type_label(change.old_value()),
                type_label(change.new_value())
            ),
            _ => self.rule.summary.to_string(),
        }
    }
}

fn type_label(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(label) => label,
        serde_json::Value::Null => "none".to_string(),
        other => other.to_string(),
    }
}

/// Assigns severities using [`RULES`] and configured overrides
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'c> {
    config: &'c ChangelogConfig,
}

impl<'c> Classifier<'c> {
    pub fn new(config: &'c ChangelogConfig) -> Self {
        Self { config }
    }

    /// Most specific matching rule; ties go to the more severe rule
    pub fn rule_for(change: &Change<'_>) -> Option<&'static Rule> {
        RULES
            .iter()
            .filter(|rule| rule.matches(change))
            .max_by_key(|rule| (rule.specificity(), rule.severity))
    }

    pub fn classify<'a>(&self, change: Change<'a>) -> ClassifiedChange<'a> {
        let rule = Self::rule_for(&change).unwrap_or_else(|| {
            warn!(
                "No classification rule for {} {} {}",
                change.entity, change.kind, change.path
            );
            &UNCLASSIFIED
        });
        let severity = self.config.override_for(rule.id).unwrap_or(rule.severity);
        ClassifiedChange {
            change,
            severity,
            rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::index::ContractIndex;
    use crate::diff::compare::compare;
    use crate::models::{Constraints, Contract, DataType, Field, Model};
    use std::collections::HashSet;

    fn classify_fields(old: Vec<Field>, new: Vec<Field>) -> Vec<(&'static str, Severity)> {
        let old =
            Contract::new("urn:o", "O", "1").with_model(Model::new("orders").with_fields(old));
        let new =
            Contract::new("urn:o", "O", "1").with_model(Model::new("orders").with_fields(new));
        let config = ChangelogConfig::default();
        let classifier = Classifier::new(&config);
        compare(&ContractIndex::build(&old), &ContractIndex::build(&new))
            .changes
            .into_iter()
            .map(|c| {
                let classified = classifier.classify(c);
                (classified.rule_id(), classified.severity)
            })
            .collect()
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Breaking);
        assert_eq!("WARNING".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_rule_ids_share_one_severity() {
        let mut seen = std::collections::HashMap::new();
        for rule in RULES {
            let severity = seen.entry(rule.id).or_insert(rule.severity);
            assert_eq!(*severity, rule.severity, "rule {}", rule.id);
        }
        let unique: HashSet<&str> = RULES.iter().map(|r| r.id).collect();
        assert!(unique.len() >= 40);
    }

    #[test]
    fn test_type_widened_vs_changed() {
        assert_eq!(
            classify_fields(
                vec![Field::scalar("id", DataType::Int)],
                vec![Field::scalar("id", DataType::Long)]
            ),
            vec![("field-type-widened", Severity::Warning)]
        );
        assert_eq!(
            classify_fields(
                vec![Field::scalar("id", DataType::Long)],
                vec![Field::scalar("id", DataType::Int)]
            ),
            vec![("field-type-changed", Severity::Breaking)]
        );
    }

    #[test]
    fn test_added_field_by_nullability() {
        let added = classify_fields(
            vec![],
            vec![
                Field::scalar("notes", DataType::String),
                Field::scalar("region", DataType::String).with_required(true),
                Field::scalar("status", DataType::String)
                    .with_required(true)
                    .with_default(serde_json::json!("new")),
            ],
        );
        assert_eq!(
            added,
            vec![
                ("field-added-optional", Severity::Warning),
                ("field-added-required", Severity::Breaking),
                ("field-added-optional", Severity::Warning),
            ]
        );
    }

    #[test]
    fn test_constraint_directions() {
        let with_max = |max| {
            Field::scalar("code", DataType::String).with_constraints(Constraints {
                max_length: Some(max),
                ..Default::default()
            })
        };
        assert_eq!(
            classify_fields(vec![with_max(20)], vec![with_max(10)]),
            vec![("field-constraints-tightened", Severity::Warning)]
        );
        assert_eq!(
            classify_fields(vec![with_max(10)], vec![with_max(20)]),
            vec![("field-constraints-relaxed", Severity::Warning)]
        );

        let old = Field::scalar("code", DataType::String).with_constraints(Constraints {
            max_length: Some(10),
            pattern: Some("^[A-Z]+$".to_string()),
            ..Default::default()
        });
        let new = Field::scalar("code", DataType::String).with_constraints(Constraints {
            max_length: Some(20),
            pattern: Some("^[0-9]+$".to_string()),
            ..Default::default()
        });
        assert_eq!(
            classify_fields(vec![old], vec![new]),
            vec![("field-constraints-changed", Severity::Breaking)]
        );
    }

    #[test]
    fn test_severity_override() {
        let old = Contract::new("urn:o", "O", "1").with_model(Model::new("orders"));
        let new = Contract::new("urn:o", "O", "1");
        let config = ChangelogConfig::builder()
            .severity_override("model-removed", Severity::Warning)
            .build();
        let classifier = Classifier::new(&config);
        let changes = compare(&ContractIndex::build(&old), &ContractIndex::build(&new)).changes;
        let classified = classifier.classify(changes[0].clone());
        assert_eq!(classified.rule_id(), "model-removed");
        assert_eq!(classified.severity, Severity::Warning);
    }

    #[test]
    fn test_type_description() {
        let old = Contract::new("urn:o", "O", "1")
            .with_model(Model::new("orders").with_field(Field::scalar("id", DataType::Int)));
        let new = Contract::new("urn:o", "O", "1")
            .with_model(Model::new("orders").with_field(Field::scalar("id", DataType::String)));
        let config = ChangelogConfig::default();
        let changes = compare(&ContractIndex::build(&old), &ContractIndex::build(&new)).changes;
        let classified = Classifier::new(&config).classify(changes[0].clone());
        assert_eq!(classified.description(), "Field type changed from int to string");
    }
}
