//! Field type for contract models
//!
//! A field is either a scalar with a [`DataType`] and value constraints, or a
//! nested container (object or array of objects) with child fields. The two
//! shapes are mutually exclusive and encoded in [`FieldKind`].

use super::quality::{Bound, QualityRule, bound_relation, tighter};
use super::relation::Relation;
use super::types::DataType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Container kind for nested fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    /// `object`, `record` or `struct`
    Object,
    /// Array whose items are objects
    Array,
}

/// Shape of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum FieldKind {
    Scalar {
        #[serde(rename = "type")]
        data_type: DataType,
        #[serde(default, skip_serializing_if = "Constraints::is_empty")]
        constraints: Constraints,
    },
    Nested {
        container: Container,
        #[serde(default)]
        fields: Vec<Field>,
    },
}

impl FieldKind {
    /// Human readable type label (`long`, `object`, `array<object>`)
    pub fn type_label(&self) -> String {
        match self {
            FieldKind::Scalar { data_type, .. } => data_type.to_string(),
            FieldKind::Nested {
                container: Container::Object,
                ..
            } => "object".to_string(),
            FieldKind::Nested {
                container: Container::Array,
                ..
            } => "array<object>".to_string(),
        }
    }
}

/// Value constraints on a scalar field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Format hint (e.g. "email", "uuid", "uri")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    /// Allowed values, canonicalized to their JSON text so that the set is
    /// order independent
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<BTreeSet<String>>,
}

impl Constraints {
    /// Check if all constraints are empty/None
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.format.is_none()
            && self.minimum.is_none()
            && self.maximum.is_none()
            && self.exclusive_minimum.is_none()
            && self.exclusive_maximum.is_none()
            && self.enum_values.is_none()
    }

    /// How the value domain allowed by `new` relates to the one of `self`
    pub fn relation_to(&self, new: &Constraints) -> Relation {
        Relation::all([
            Relation::of_lower(self.min_length, new.min_length),
            Relation::of_upper(self.max_length, new.max_length),
            Relation::of_restriction(self.pattern.as_ref(), new.pattern.as_ref()),
            Relation::of_restriction(self.format.as_ref(), new.format.as_ref()),
            bound_relation(self.lower_bound(), new.lower_bound(), true),
            bound_relation(self.upper_bound(), new.upper_bound(), false),
            enum_relation(self.enum_values.as_ref(), new.enum_values.as_ref()),
        ])
    }

    /// Effective lower bound of `minimum` and `exclusiveMinimum`
    pub fn lower_bound(&self) -> Option<Bound> {
        let inclusive = self.minimum.map(Bound::inclusive);
        match self.exclusive_minimum {
            Some(value) => tighter(inclusive, Bound::exclusive(value), true),
            None => inclusive,
        }
    }

    /// Effective upper bound of `maximum` and `exclusiveMaximum`
    pub fn upper_bound(&self) -> Option<Bound> {
        let inclusive = self.maximum.map(Bound::inclusive);
        match self.exclusive_maximum {
            Some(value) => tighter(inclusive, Bound::exclusive(value), false),
            None => inclusive,
        }
    }
}

fn enum_relation(old: Option<&BTreeSet<String>>, new: Option<&BTreeSet<String>>) -> Relation {
    match (old, new) {
        (None, None) => Relation::Equal,
        (None, Some(_)) => Relation::Narrower,
        (Some(_), None) => Relation::Wider,
        (Some(o), Some(n)) if o == n => Relation::Equal,
        (Some(o), Some(n)) if n.is_subset(o) => Relation::Narrower,
        (Some(o), Some(n)) if n.is_superset(o) => Relation::Wider,
        _ => Relation::Incomparable,
    }
}

/// Descriptive metadata that never affects compatibility
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pii: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

/// Field - one attribute of a model
///
/// # Example
///
/// ```rust
/// use datacontract_core::models::{DataType, Field};
///
/// let address = Field::object("address").with_fields(vec![
///     Field::scalar("street", DataType::String),
///     Field::scalar("zip", DataType::Varchar).with_required(true),
/// ]);
/// assert_eq!(address.nested_fields().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary: bool,
    /// Foreign key pointer (`model.field`), not resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality: Vec<QualityRule>,
    #[serde(default)]
    pub metadata: FieldMetadata,
}

impl Field {
    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            unique: false,
            primary: false,
            references: None,
            default: None,
            title: None,
            description: None,
            quality: Vec::new(),
            metadata: FieldMetadata::default(),
        }
    }

    /// Create a nullable scalar field
    pub fn scalar(name: impl Into<String>, data_type: DataType) -> Self {
        Self::with_kind(
            name,
            FieldKind::Scalar {
                data_type,
                constraints: Constraints::default(),
            },
        )
    }

    /// Create an object field with no children
    pub fn object(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            FieldKind::Nested {
                container: Container::Object,
                fields: Vec::new(),
            },
        )
    }

    /// Create an array-of-objects field with no children
    pub fn array_of_objects(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            FieldKind::Nested {
                container: Container::Array,
                fields: Vec::new(),
            },
        )
    }

    /// Set the required flag
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the unique flag
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Set the primary key flag
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// Set the foreign key reference
    pub fn with_references(mut self, references: impl Into<String>) -> Self {
        self.references = Some(references.into());
        self
    }

    /// Set the default value
    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a quality rule
    pub fn with_quality_rule(mut self, rule: QualityRule) -> Self {
        self.quality.push(rule);
        self
    }

    /// Set the scalar constraints; ignored for nested fields
    pub fn with_constraints(mut self, new_constraints: Constraints) -> Self {
        if let FieldKind::Scalar { constraints, .. } = &mut self.kind {
            *constraints = new_constraints;
        }
        self
    }

    /// Set the nested children; ignored for scalar fields
    pub fn with_fields(mut self, children: Vec<Field>) -> Self {
        if let FieldKind::Nested { fields, .. } = &mut self.kind {
            *fields = children;
        }
        self
    }

    /// Set the tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.metadata.tags = tags;
        self
    }

    /// Check if the field accepts null values
    pub fn is_nullable(&self) -> bool {
        !self.required
    }

    /// Get the children of a nested field (empty for scalars)
    pub fn nested_fields(&self) -> &[Field] {
        match &self.kind {
            FieldKind::Nested { fields, .. } => fields,
            FieldKind::Scalar { .. } => &[],
        }
    }

    /// Get the scalar data type, if any
    pub fn data_type(&self) -> Option<&DataType> {
        match &self.kind {
            FieldKind::Scalar { data_type, .. } => Some(data_type),
            FieldKind::Nested { .. } => None,
        }
    }

    /// Get the scalar constraints, if any
    pub fn constraints(&self) -> Option<&Constraints> {
        match &self.kind {
            FieldKind::Scalar { constraints, .. } => Some(constraints),
            FieldKind::Nested { .. } => None,
        }
    }
}
