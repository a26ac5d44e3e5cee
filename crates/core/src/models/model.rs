//! Model type - one dataset (table, view, topic, file) in a contract

use super::field::Field;
use super::quality::QualityRule;
use serde::{Deserialize, Serialize};

/// Model - one dataset definition within a contract
///
/// # Example
///
/// ```rust
/// use datacontract_core::models::{DataType, Field, Model};
///
/// let orders = Model::new("orders")
///     .with_model_type("table")
///     .with_description("One row per order")
///     .with_fields(vec![
///         Field::scalar("order_id", DataType::Long).with_required(true).with_primary(true),
///         Field::scalar("notes", DataType::String),
///     ]);
///
/// assert_eq!(orders.field_count(), 2);
/// assert!(orders.get_field("order_id").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Model name (unique within a contract)
    pub name: String,
    /// Type tag: "table", "view", "topic", "file", "object", ...
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Model-level primary key declaration (field names)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Vec<String>>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality: Vec<QualityRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Model {
    /// Create a new model with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the type tag
    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = Some(model_type.into());
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

    /// Set the model-level primary key
    pub fn with_primary_key(mut self, columns: Vec<String>) -> Self {
        self.primary_key = Some(columns);
        self
    }

    /// Set the fields
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// Add a field
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a quality rule
    pub fn with_quality_rule(mut self, rule: QualityRule) -> Self {
        self.quality.push(rule);
        self
    }

    /// Set the tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Get a top-level field by name
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Count of top-level fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Names of the primary key columns
    ///
    /// Uses the model-level declaration when present, otherwise the fields
    /// flagged as primary.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        match &self.primary_key {
            Some(columns) => columns.iter().map(String::as_str).collect(),
            None => self
                .fields
                .iter()
                .filter(|f| f.primary)
                .map(|f| f.name.as_str())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataType;

    #[test]
    fn test_model_creation() {
        let model = Model::new("line_items")
            .with_model_type("table")
            .with_title("Line items")
            .with_tags(vec!["sales".to_string()]);

        assert_eq!(model.name, "line_items");
        assert_eq!(model.model_type, Some("table".to_string()));
        assert_eq!(model.field_count(), 0);
    }

    #[test]
    fn test_primary_key_columns() {
        let flagged = Model::new("orders")
            .with_field(Field::scalar("id", DataType::Long).with_primary(true))
            .with_field(Field::scalar("total", DataType::Double));
        assert_eq!(flagged.primary_key_columns(), vec!["id"]);

        let declared = flagged
            .clone()
            .with_primary_key(vec!["id".to_string(), "total".to_string()]);
        assert_eq!(declared.primary_key_columns(), vec!["id", "total"]);
    }

    #[test]
    fn test_serialization() {
        let model = Model::new("events").with_model_type("topic");
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains("\"type\":\"topic\""));
        assert!(!json.contains("model_type"));
    }
}
