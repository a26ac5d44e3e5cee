//! Structural comparison of two indexed contracts
//!
//! Walks the sorted union of both key sets. Keys present on one side only
//! become `added`/`removed` records; keys present on both sides produce one
//! `modified` record per differing attribute group. Child nodes have their
//! own keys, so a parent never reports differences of its children.

use super::index::{ContractIndex, Node};
use super::path::PathKey;
use crate::models::{Field, FieldKind, Model, QualityRule, Server};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// Kind of entity a change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Model,
    Field,
    QualityRule,
    Server,
    /// Info block, terms
    Metadata,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Model => "model",
            EntityKind::Field => "field",
            EntityKind::QualityRule => "quality-rule",
            EntityKind::Server => "server",
            EntityKind::Metadata => "metadata",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }

    /// The kind seen when comparing in the opposite direction
    pub fn reversed(&self) -> ChangeKind {
        match self {
            ChangeKind::Added => ChangeKind::Removed,
            ChangeKind::Removed => ChangeKind::Added,
            ChangeKind::Modified => ChangeKind::Modified,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute group of a `modified` record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Attribute {
    Type,
    Nullability,
    Uniqueness,
    PrimaryKey,
    Constraints,
    References,
    Default,
    Threshold,
    Parameters,
    Description,
    Metadata,
}

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Type => "type",
            Attribute::Nullability => "nullability",
            Attribute::Uniqueness => "uniqueness",
            Attribute::PrimaryKey => "primary-key",
            Attribute::Constraints => "constraints",
            Attribute::References => "references",
            Attribute::Default => "default",
            Attribute::Threshold => "threshold",
            Attribute::Parameters => "parameters",
            Attribute::Description => "description",
            Attribute::Metadata => "metadata",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw difference between two contracts
///
/// Borrows the nodes of both documents; `old` is absent for additions and
/// `new` for removals.
#[derive(Debug, Clone, PartialEq)]
pub struct Change<'a> {
    pub path: PathKey,
    pub kind: ChangeKind,
    pub entity: EntityKind,
    pub attribute: Option<Attribute>,
    pub old: Option<Node<'a>>,
    pub new: Option<Node<'a>>,
}

impl<'a> Change<'a> {
    fn presence(path: PathKey, kind: ChangeKind, node: Node<'a>) -> Self {
        let (old, new) = match kind {
            ChangeKind::Removed => (Some(node), None),
            _ => (None, Some(node)),
        };
        Self {
            path,
            kind,
            entity: node.entity_kind(),
            attribute: None,
            old,
            new,
        }
    }

    fn modified(path: PathKey, attribute: Attribute, old: Node<'a>, new: Node<'a>) -> Self {
        Self {
            path,
            kind: ChangeKind::Modified,
            entity: old.entity_kind(),
            attribute: Some(attribute),
            old: Some(old),
            new: Some(new),
        }
    }

    /// Old field, when this change is about a field
    pub fn old_field(&self) -> Option<&'a Field> {
        match self.old {
            Some(Node::Field(field)) => Some(field),
            _ => None,
        }
    }

    /// New field, when this change is about a field
    pub fn new_field(&self) -> Option<&'a Field> {
        match self.new {
            Some(Node::Field(field)) => Some(field),
            _ => None,
        }
    }

    pub fn old_model(&self) -> Option<&'a Model> {
        match self.old {
            Some(Node::Model(model)) => Some(model),
            _ => None,
        }
    }

    pub fn new_model(&self) -> Option<&'a Model> {
        match self.new {
            Some(Node::Model(model)) => Some(model),
            _ => None,
        }
    }

    pub fn old_rule(&self) -> Option<&'a QualityRule> {
        match self.old {
            Some(Node::Quality(rule)) => Some(rule),
            _ => None,
        }
    }

    pub fn new_rule(&self) -> Option<&'a QualityRule> {
        match self.new {
            Some(Node::Quality(rule)) => Some(rule),
            _ => None,
        }
    }

    /// JSON projection of the old side (the attribute group for `modified`)
    pub fn old_value(&self) -> Value {
        project(self.old, self.attribute)
    }

    /// JSON projection of the new side (the attribute group for `modified`)
    pub fn new_value(&self) -> Value {
        project(self.new, self.attribute)
    }
}

impl Serialize for Change<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Change", 6)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("entityKind", &self.entity)?;
        state.serialize_field("changeKind", &self.kind)?;
        state.serialize_field("attribute", &self.attribute)?;
        state.serialize_field("oldValue", &self.old_value())?;
        state.serialize_field("newValue", &self.new_value())?;
        state.end()
    }
}

/// Result of a structural comparison
#[derive(Debug, Clone, Default, Serialize)]
pub struct Comparison<'a> {
    pub changes: Vec<Change<'a>>,
    /// Paths present in both documents with no differing attribute
    #[serde(skip)]
    pub unchanged: Vec<PathKey>,
}

impl Comparison<'_> {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Compare two indexed documents
pub fn compare<'a>(old: &ContractIndex<'a>, new: &ContractIndex<'a>) -> Comparison<'a> {
    let keys: BTreeSet<&PathKey> = old.keys().chain(new.keys()).collect();
    let mut comparison = Comparison::default();

    for key in keys {
        match (old.get(key), new.get(key)) {
            (Some(node), None) => comparison.changes.push(Change::presence(
                key.clone(),
                ChangeKind::Removed,
                node,
            )),
            (None, Some(node)) => comparison.changes.push(Change::presence(
                key.clone(),
                ChangeKind::Added,
                node,
            )),
            (Some(old_node), Some(new_node)) => {
                let attributes = differing_attributes(old_node, new_node);
                if attributes.is_empty() {
                    comparison.unchanged.push(key.clone());
                }
                for attribute in attributes {
                    comparison.changes.push(Change::modified(
                        key.clone(),
                        attribute,
                        old_node,
                        new_node,
                    ));
                }
            }
            (None, None) => {}
        }
    }

    debug!(
        "Compared {} old / {} new nodes: {} changes, {} unchanged",
        old.len(),
        new.len(),
        comparison.changes.len(),
        comparison.unchanged.len()
    );
    comparison
}

/// Attribute groups that differ between two nodes at the same path
pub fn differing_attributes(old: Node<'_>, new: Node<'_>) -> Vec<Attribute> {
    let mut attributes = Vec::new();
    let mut check = |attribute: Attribute, differs: bool| {
        if differs {
            attributes.push(attribute);
        }
    };

    match (old, new) {
        (Node::Info(o), Node::Info(n)) => {
            check(
                Attribute::Description,
                o.info.title != n.info.title || o.info.description != n.info.description,
            );
            check(
                Attribute::Metadata,
                o.id != n.id
                    || o.specification != n.specification
                    || o.info.version != n.info.version
                    || o.info.owner != n.info.owner
                    || o.info.contact != n.info.contact,
            );
        }
        (Node::Terms(o), Node::Terms(n)) => check(Attribute::Metadata, o != n),
        (Node::Server(o), Node::Server(n)) => server_attributes(o, n, &mut check),
        (Node::Model(o), Node::Model(n)) => {
            check(Attribute::Type, o.model_type != n.model_type);
            check(Attribute::PrimaryKey, o.primary_key != n.primary_key);
            check(
                Attribute::Description,
                o.title != n.title || o.description != n.description,
            );
            check(Attribute::Metadata, !same_set(&o.tags, &n.tags));
        }
        (Node::Field(o), Node::Field(n)) => field_attributes(o, n, &mut check),
        (Node::Quality(o), Node::Quality(n)) => {
            check(Attribute::Type, o.kind != n.kind);
            check(Attribute::Threshold, o.threshold != n.threshold);
            check(Attribute::Parameters, !same_map(&o.params, &n.params));
            check(Attribute::Description, o.description != n.description);
        }
        // a path always addresses the same kind of node
        _ => check(Attribute::Type, true),
    }

    attributes
}

fn server_attributes(old: &Server, new: &Server, check: &mut impl FnMut(Attribute, bool)) {
    check(Attribute::Type, old.server_type != new.server_type);
    check(Attribute::Parameters, !same_map(&old.params, &new.params));
    check(Attribute::Description, old.description != new.description);
}

fn field_attributes(old: &Field, new: &Field, check: &mut impl FnMut(Attribute, bool)) {
    match (&old.kind, &new.kind) {
        (
            FieldKind::Scalar {
                data_type: old_type,
                constraints: old_constraints,
            },
            FieldKind::Scalar {
                data_type: new_type,
                constraints: new_constraints,
            },
        ) => {
            check(Attribute::Type, old_type != new_type);
            check(Attribute::Constraints, old_constraints != new_constraints);
        }
        (
            FieldKind::Nested {
                container: old_container,
                ..
            },
            FieldKind::Nested {
                container: new_container,
                ..
            },
        ) => check(Attribute::Type, old_container != new_container),
        // shape change between scalar and nested is a type change only
        _ => check(Attribute::Type, true),
    }

    check(Attribute::Nullability, old.required != new.required);
    check(Attribute::Uniqueness, old.unique != new.unique);
    check(Attribute::PrimaryKey, old.primary != new.primary);
    check(Attribute::References, old.references != new.references);
    check(
        Attribute::Default,
        !same_optional_value(old.default.as_ref(), new.default.as_ref()),
    );
    check(
        Attribute::Description,
        old.title != new.title || old.description != new.description,
    );
    check(
        Attribute::Metadata,
        !same_set(&old.metadata.tags, &new.metadata.tags)
            || old.metadata.pii != new.metadata.pii
            || old.metadata.classification != new.metadata.classification
            || !same_optional_value(old.metadata.example.as_ref(), new.metadata.example.as_ref()),
    );
}

fn same_set(old: &[String], new: &[String]) -> bool {
    old.iter().collect::<BTreeSet<_>>() == new.iter().collect::<BTreeSet<_>>()
}

fn same_map(old: &BTreeMap<String, Value>, new: &BTreeMap<String, Value>) -> bool {
    old.len() == new.len()
        && old
            .iter()
            .all(|(key, value)| new.get(key).is_some_and(|other| same_value(value, other)))
}

fn same_optional_value(old: Option<&Value>, new: Option<&Value>) -> bool {
    match (old, new) {
        (Some(o), Some(n)) => same_value(o, n),
        (None, None) => true,
        _ => false,
    }
}

/// JSON equality with numeric normalization (`1` equals `1.0`)
pub fn same_value(old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::Number(o), Value::Number(n)) => match (o.as_f64(), n.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => o == n,
        },
        (Value::Array(o), Value::Array(n)) => {
            o.len() == n.len() && o.iter().zip(n).all(|(a, b)| same_value(a, b))
        }
        (Value::Object(o), Value::Object(n)) => {
            o.len() == n.len()
                && o
                    .iter()
                    .all(|(key, value)| n.get(key).is_some_and(|other| same_value(value, other)))
        }
        _ => old == new,
    }
}

/// Project the attribute group of a node into JSON
fn project(node: Option<Node<'_>>, attribute: Option<Attribute>) -> Value {
    let Some(node) = node else {
        return Value::Null;
    };
    let Some(attribute) = attribute else {
        return serde_json::to_value(node).unwrap_or(Value::Null);
    };

    match (node, attribute) {
        (Node::Info(contract), Attribute::Description) => json!({
            "title": contract.info.title,
            "description": contract.info.description,
        }),
        (Node::Info(contract), _) => json!({
            "id": contract.id,
            "specification": contract.specification,
            "version": contract.info.version,
            "owner": contract.info.owner,
            "contact": contract.info.contact,
        }),
        (Node::Terms(terms), _) => serde_json::to_value(terms).unwrap_or(Value::Null),
        (Node::Server(server), Attribute::Type) => json!(server.server_type),
        (Node::Server(server), Attribute::Description) => json!(server.description),
        (Node::Server(server), _) => json!(server.params),
        (Node::Model(model), Attribute::Type) => json!(model.model_type),
        (Node::Model(model), Attribute::PrimaryKey) => json!(model.primary_key),
        (Node::Model(model), Attribute::Description) => json!({
            "title": model.title,
            "description": model.description,
        }),
        (Node::Model(model), _) => json!(model.tags),
        (Node::Field(field), attribute) => project_field(field, attribute),
        (Node::Quality(rule), Attribute::Type) => json!(rule.kind),
        (Node::Quality(rule), Attribute::Threshold) => json!(rule.threshold),
        (Node::Quality(rule), Attribute::Description) => json!(rule.description),
        (Node::Quality(rule), _) => json!(rule.params),
    }
}

fn project_field(field: &Field, attribute: Attribute) -> Value {
    match attribute {
        Attribute::Type => json!(field.kind.type_label()),
        Attribute::Nullability => json!({ "required": field.required }),
        Attribute::Uniqueness => json!({ "unique": field.unique }),
        Attribute::PrimaryKey => json!({ "primary": field.primary }),
        Attribute::Constraints => field
            .constraints()
            .and_then(|c| serde_json::to_value(c).ok())
            .unwrap_or(Value::Null),
        Attribute::References => json!(field.references),
        Attribute::Default => json!(field.default),
        Attribute::Description => json!({
            "title": field.title,
            "description": field.description,
        }),
        _ => serde_json::to_value(&field.metadata).unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Constraints, Contract, DataType, Model, QualityKind, Threshold};

    fn orders(fields: Vec<Field>) -> Contract {
        Contract::new("urn:orders", "Orders", "1.0.0")
            .with_model(Model::new("orders").with_fields(fields))
    }

    fn run<'a>(old: &'a Contract, new: &'a Contract) -> Comparison<'a> {
        compare(&ContractIndex::build(old), &ContractIndex::build(new))
    }

    #[test]
    fn test_identical_documents() {
        let contract = orders(vec![Field::scalar("id", DataType::Long)]);
        let comparison = run(&contract, &contract);
        assert!(comparison.is_empty());
        assert_eq!(comparison.unchanged.len(), 3);
    }

    #[test]
    fn test_added_and_removed() {
        let old = orders(vec![Field::scalar("a", DataType::Long)]);
        let new = orders(vec![Field::scalar("b", DataType::Long)]);
        let comparison = run(&old, &new);
        let summary: Vec<(String, ChangeKind)> = comparison
            .changes
            .iter()
            .map(|c| (c.path.to_string(), c.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("models.orders.fields.a".to_string(), ChangeKind::Removed),
                ("models.orders.fields.b".to_string(), ChangeKind::Added),
            ]
        );
    }

    #[test]
    fn test_one_record_per_attribute_group() {
        let old = orders(vec![Field::scalar("email", DataType::Varchar).with_required(true)]);
        let new = orders(vec![
            Field::scalar("email", DataType::String).with_description("Customer email"),
        ]);
        let comparison = run(&old, &new);
        let attributes: Vec<Attribute> = comparison
            .changes
            .iter()
            .filter_map(|c| c.attribute)
            .collect();
        assert_eq!(
            attributes,
            vec![
                Attribute::Type,
                Attribute::Nullability,
                Attribute::Description
            ]
        );
    }

    #[test]
    fn test_shape_change_is_type_only() {
        let old = orders(vec![Field::scalar("address", DataType::String).with_constraints(
            Constraints {
                max_length: Some(200),
                ..Default::default()
            },
        )]);
        let new = orders(vec![
            Field::object("address").with_fields(vec![Field::scalar("street", DataType::String)]),
        ]);
        let comparison = run(&old, &new);
        let address: Vec<&Change<'_>> = comparison
            .changes
            .iter()
            .filter(|c| c.path.to_string() == "models.orders.fields.address")
            .collect();
        assert_eq!(address.len(), 1);
        assert_eq!(address[0].attribute, Some(Attribute::Type));
        assert_eq!(address[0].old_value(), json!("string"));
        assert_eq!(address[0].new_value(), json!("object"));
    }

    #[test]
    fn test_numeric_default_normalized() {
        let old = orders(vec![Field::scalar("qty", DataType::Double).with_default(json!(1))]);
        let new = orders(vec![Field::scalar("qty", DataType::Double).with_default(json!(1.0))]);
        assert!(run(&old, &new).is_empty());
    }

    #[test]
    fn test_tag_order_ignored() {
        let old = orders(vec![
            Field::scalar("id", DataType::Long).with_tags(vec!["a".into(), "b".into()]),
        ]);
        let new = orders(vec![
            Field::scalar("id", DataType::Long).with_tags(vec!["b".into(), "a".into()]),
        ]);
        assert!(run(&old, &new).is_empty());
    }

    #[test]
    fn test_quality_threshold_projection() {
        let rule = |min: f64| {
            QualityRule::new(QualityKind::RowCount).with_threshold(Threshold::at_least(min))
        };
        let contract = |min: f64| {
            let model = Model::new("o").with_quality_rule(rule(min));
            Contract::new("urn:o", "O", "1").with_model(model)
        };
        let old = contract(10.0);
        let new = contract(100.0);
        let comparison = run(&old, &new);
        assert_eq!(comparison.changes.len(), 1);
        let change = &comparison.changes[0];
        assert_eq!(change.entity, EntityKind::QualityRule);
        assert_eq!(change.attribute, Some(Attribute::Threshold));
        assert_eq!(change.new_value()["lower"]["value"], json!(100.0));
    }

    #[test]
    fn test_serialized_record() {
        let old = orders(vec![Field::scalar("id", DataType::Int)]);
        let new = orders(vec![Field::scalar("id", DataType::Long)]);
        let comparison = run(&old, &new);
        let json = serde_json::to_value(&comparison).unwrap();
        let record = &json["changes"][0];
        assert_eq!(record["path"], "models.orders.fields.id");
        assert_eq!(record["entityKind"], "field");
        assert_eq!(record["changeKind"], "modified");
        assert_eq!(record["attribute"], "type");
        assert_eq!(record["oldValue"], "int");
        assert_eq!(record["newValue"], "long");
    }
}
