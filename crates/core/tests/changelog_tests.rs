//! Changelog scenario tests

use datacontract_core::config::ChangelogConfig;
use datacontract_core::diff::{self, ChangeKind, EntityKind, Severity};
use datacontract_core::loader::ContractLoader;
use datacontract_core::models::Contract;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn load(yaml: &str) -> Contract {
    ContractLoader::default().load_str(yaml).unwrap()
}

fn fixture(name: &str) -> String {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "fixtures", name]
        .iter()
        .collect();
    path.to_string_lossy().into_owned()
}

/// Orders contract with the given field block under `models.orders.fields`
fn orders(fields: &str) -> Contract {
    let mut yaml = String::from(
        "id: urn:datacontract:orders\ninfo:\n  title: Orders\n  version: 1.0.0\n\
         models:\n  orders:\n    type: table\n    description: All orders\n    fields:\n",
    );
    for line in fields.lines().filter(|l| !l.trim().is_empty()) {
        yaml.push_str("      ");
        yaml.push_str(line.trim_start_matches(' '));
        yaml.push('\n');
    }
    load(&yaml)
}

const BASE_FIELDS: &str = "
order_id: { type: long, required: true, primaryKey: true }
customer_id: { type: long, required: true }
email: { type: string, required: true }
amount: { type: decimal, precision: 10, scale: 2 }
status: { type: string, enum: [pending, shipped] }
";

fn records(old: &Contract, new: &Contract) -> Vec<(String, ChangeKind, EntityKind, Severity)> {
    diff::changelog(old, new, &ChangelogConfig::default())
        .all_changes()
        .iter()
        .map(|c| {
            (
                c.change.path.to_string(),
                c.change.kind,
                c.change.entity,
                c.severity,
            )
        })
        .collect()
}

#[test]
fn test_field_removal_is_breaking() {
    let old = orders(BASE_FIELDS);
    let new = orders(
        "
order_id: { type: long, required: true, primaryKey: true }
email: { type: string, required: true }
amount: { type: decimal, precision: 10, scale: 2 }
status: { type: string, enum: [pending, shipped] }
",
    );
    assert_eq!(
        records(&old, &new),
        vec![(
            "models.orders.fields.customer_id".to_string(),
            ChangeKind::Removed,
            EntityKind::Field,
            Severity::Breaking
        )]
    );
    assert!(diff::changelog(&old, &new, &ChangelogConfig::default()).has_breaking());
}

#[test]
fn test_nullable_field_addition_is_safe() {
    let old = orders(BASE_FIELDS);
    let new = orders(&format!("{}notes: {{ type: string }}\n", BASE_FIELDS));
    assert_eq!(
        records(&old, &new),
        vec![(
            "models.orders.fields.notes".to_string(),
            ChangeKind::Added,
            EntityKind::Field,
            Severity::Warning
        )]
    );
    assert!(!diff::changelog(&old, &new, &ChangelogConfig::default()).has_breaking());
}

#[test]
fn test_required_field_addition_is_breaking() {
    let old = orders(BASE_FIELDS);
    let new = orders(&format!(
        "{}region: {{ type: string, required: true }}\n",
        BASE_FIELDS
    ));
    assert_eq!(
        records(&old, &new),
        vec![(
            "models.orders.fields.region".to_string(),
            ChangeKind::Added,
            EntityKind::Field,
            Severity::Breaking
        )]
    );
}

#[test]
fn test_required_field_with_default_is_safe() {
    let old = orders(BASE_FIELDS);
    let new = orders(&format!(
        "{}region: {{ type: string, required: true, default: EU }}\n",
        BASE_FIELDS
    ));
    let changelog = diff::changelog(&old, &new, &ChangelogConfig::default());
    assert_eq!(changelog.all_changes()[0].rule_id(), "field-added-optional");
}

#[test]
fn test_relaxed_nullability_is_warning() {
    let old = orders(BASE_FIELDS);
    let new = orders(&BASE_FIELDS.replace(
        "email: { type: string, required: true }",
        "email: { type: string }",
    ));
    assert_eq!(
        records(&old, &new),
        vec![(
            "models.orders.fields.email".to_string(),
            ChangeKind::Modified,
            EntityKind::Field,
            Severity::Warning
        )]
    );
}

#[test]
fn test_description_only_edit_is_info() {
    let old = orders(BASE_FIELDS);
    let mut new = old.clone();
    new.models[0].description = Some("All orders, including cancelled ones".to_string());

    let changelog = diff::changelog(&old, &new, &ChangelogConfig::default());
    assert_eq!(
        records(&old, &new),
        vec![(
            "models.orders".to_string(),
            ChangeKind::Modified,
            EntityKind::Model,
            Severity::Info
        )]
    );
    assert_eq!(changelog.all_changes()[0].rule_id(), "model-description-changed");
    assert!(!changelog.has_breaking());
}

#[test]
fn test_model_removal_collapses_fields() {
    let old = orders(BASE_FIELDS);
    let mut new = old.clone();
    new.models.clear();

    let comparison = diff::diff(&old, &new);
    // the raw diff still has the model and its five fields
    assert_eq!(comparison.changes.len(), 6);

    assert_eq!(
        records(&old, &new),
        vec![(
            "models.orders".to_string(),
            ChangeKind::Removed,
            EntityKind::Model,
            Severity::Breaking
        )]
    );
}

#[test]
fn test_enum_value_removed_tightens() {
    let old = orders(BASE_FIELDS);
    let new = orders(&BASE_FIELDS.replace("enum: [pending, shipped]", "enum: [shipped]"));
    let changelog = diff::changelog(&old, &new, &ChangelogConfig::default());
    assert_eq!(changelog.len(), 1);
    assert_eq!(changelog.all_changes()[0].rule_id(), "field-constraints-tightened");
    assert_eq!(changelog.all_changes()[0].severity, Severity::Warning);
}

#[test]
fn test_numeric_enum_spelling_is_not_a_change() {
    let old = orders("priority: { type: int, enum: [1, 2, 3] }");
    let new = orders("priority: { type: int, enum: [3.0, 2.0, 1.0] }");
    assert!(diff::changelog(&old, &new, &ChangelogConfig::default()).is_empty());
}

#[test]
fn test_inclusive_to_exclusive_minimum_tightens() {
    let old = orders("quantity: { type: int, minimum: 0 }");
    let new = orders("quantity: { type: int, exclusiveMinimum: 0 }");
    let changelog = diff::changelog(&old, &new, &ChangelogConfig::default());
    assert_eq!(changelog.len(), 1);
    assert_eq!(changelog.all_changes()[0].rule_id(), "field-constraints-tightened");
    assert_eq!(changelog.all_changes()[0].severity, Severity::Warning);

    let reverted = diff::changelog(&new, &old, &ChangelogConfig::default());
    assert_eq!(reverted.all_changes()[0].rule_id(), "field-constraints-relaxed");
}

#[test]
fn test_referenced_quality_check_edit_is_detected() {
    let write_version = |dir: &std::path::Path, threshold: u64| {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("checks.yaml"),
            format!("checks for orders:\n  - row_count > {}\n", threshold),
        )
        .unwrap();
        fs::write(
            dir.join("datacontract.yaml"),
            "id: urn:datacontract:orders\ninfo: { title: Orders, version: 1.0.0 }\n\
             quality:\n  - type: SodaCL\n    specification: { $ref: ./checks.yaml }\n",
        )
        .unwrap();
        ContractLoader::default()
            .load(&dir.join("datacontract.yaml").to_string_lossy())
            .unwrap()
    };
    let root = TempDir::new().unwrap();
    let old = write_version(&root.path().join("v1"), 10);
    let new = write_version(&root.path().join("v2"), 100_000);

    let changelog = diff::changelog(&old, &new, &ChangelogConfig::default());
    assert_eq!(changelog.len(), 1);
    assert_eq!(changelog.all_changes()[0].rule_id(), "quality-parameters-changed");
    assert_eq!(changelog.all_changes()[0].severity, Severity::Warning);
}

#[test]
fn test_decimal_scale_loss_is_breaking() {
    let old = orders(BASE_FIELDS);
    let new = orders(&BASE_FIELDS.replace("precision: 10, scale: 2", "precision: 12, scale: 1"));
    let changelog = diff::changelog(&old, &new, &ChangelogConfig::default());
    assert_eq!(changelog.all_changes()[0].rule_id(), "field-type-changed");
    assert!(changelog.has_breaking());
}

#[test]
fn test_type_alias_is_not_a_change() {
    let old = orders(BASE_FIELDS);
    let new = orders(&BASE_FIELDS.replace("email: { type: string", "email: { type: text"));
    assert!(diff::changelog(&old, &new, &ChangelogConfig::default()).is_empty());
}

#[test]
fn test_fixture_versions() {
    let loader = ContractLoader::default();
    let old = loader.load(&fixture("orders_v1.yaml")).unwrap();
    let new = loader.load(&fixture("orders_v2.yaml")).unwrap();
    let changelog = diff::changelog(&old, &new, &ChangelogConfig::default());

    let rules: Vec<(String, &str)> = changelog
        .all_changes()
        .iter()
        .map(|c| (c.change.path.to_string(), c.rule_id()))
        .collect();
    assert_eq!(
        rules,
        vec![
            ("models.orders.fields.order_total".to_string(), "field-removed"),
            ("models.line_items.fields.discount".to_string(), "field-added-optional"),
            ("models.line_items.fields.quantity".to_string(), "field-type-widened"),
            ("models.orders.quality.row_count.0".to_string(), "quality-threshold-tightened"),
            ("servers.production".to_string(), "server-changed"),
            ("models.line_items.fields.sku".to_string(), "field-description-changed"),
            ("info".to_string(), "metadata-changed"),
        ]
    );

    let summary = changelog.summary();
    assert_eq!((summary.breaking, summary.warning, summary.info), (1, 4, 2));

    let breaking = diff::breaking(&old, &new, &ChangelogConfig::default());
    assert_eq!(breaking.len(), 5);
    assert!(!breaking.passes(Severity::Breaking));
}

#[test]
fn test_severity_override_changes_gate() {
    let old = orders(BASE_FIELDS);
    let new = orders(&format!(
        "{}region: {{ type: string, required: true }}\n",
        BASE_FIELDS
    ));
    let config = ChangelogConfig::builder()
        .severity_override("field-added-required", Severity::Warning)
        .build();
    let changelog = diff::changelog(&old, &new, &config);
    assert!(!changelog.has_breaking());
    assert!(changelog.passes(config.fail_on));
}

#[test]
fn test_empty_to_populated() {
    let empty = load("id: urn:datacontract:orders\ninfo:\n  title: Orders\n  version: 1.0.0\n");
    let populated = orders(BASE_FIELDS);

    let added = diff::changelog(&empty, &populated, &ChangelogConfig::default());
    assert_eq!(added.len(), 1);
    assert_eq!(added.all_changes()[0].rule_id(), "model-added");
    assert_eq!(added.all_changes()[0].severity, Severity::Info);

    let removed = diff::changelog(&populated, &empty, &ChangelogConfig::default());
    assert_eq!(removed.len(), 1);
    assert!(removed.has_breaking());
}
