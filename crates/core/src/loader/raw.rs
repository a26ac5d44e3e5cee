//! Raw document shapes as written in contract YAML
//!
//! These types mirror the Data Contract Specification layout (mappings keyed
//! by name, optional everything) and only exist between parsing and
//! conversion into [`crate::models`].

use crate::models::{Contact, Terms};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Root of a contract document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContract {
    pub data_contract_specification: Option<String>,
    pub id: Option<String>,
    #[serde(default)]
    pub info: RawInfo,
    pub terms: Option<Terms>,
    #[serde(default, deserialize_with = "named::deserialize")]
    pub servers: Vec<(String, RawServer)>,
    #[serde(default, deserialize_with = "named::deserialize")]
    pub models: Vec<(String, RawModel)>,
    #[serde(default, deserialize_with = "named::deserialize")]
    pub definitions: Vec<(String, RawField)>,
    pub quality: Option<RawQualitySection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInfo {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub contact: Option<Contact>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawServer {
    #[serde(rename = "type")]
    pub server_type: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModel {
    #[serde(rename = "type")]
    pub model_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub primary_key: Option<Vec<String>>,
    #[serde(default, deserialize_with = "named::deserialize")]
    pub fields: Vec<(String, RawField)>,
    pub quality: Option<RawQualitySection>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Field (or definition) as written in the document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub required: Option<bool>,
    pub unique: Option<bool>,
    #[serde(alias = "primaryKey")]
    pub primary: Option<bool>,
    pub references: Option<String>,
    pub default: Option<serde_json::Value>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub format: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<serde_json::Value>>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    #[serde(default, deserialize_with = "named::deserialize")]
    pub fields: Vec<(String, RawField)>,
    pub items: Option<Box<RawField>>,
    pub quality: Option<RawQualitySection>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub pii: Option<bool>,
    pub classification: Option<String>,
    pub example: Option<serde_json::Value>,
}

impl RawField {
    /// Check whether any scalar constraint keyword is set
    pub fn has_scalar_constraints(&self) -> bool {
        self.min_length.is_some()
            || self.max_length.is_some()
            || self.pattern.is_some()
            || self.format.is_some()
            || self.minimum.is_some()
            || self.maximum.is_some()
            || self.exclusive_minimum.is_some()
            || self.exclusive_maximum.is_some()
            || self.enum_values.is_some()
            || self.precision.is_some()
            || self.scale.is_some()
    }

    /// Fill every attribute this field leaves unset from a definition
    pub fn inherit(&mut self, definition: &RawField) {
        fn fill<T: Clone>(slot: &mut Option<T>, from: &Option<T>) {
            if slot.is_none() {
                slot.clone_from(from);
            }
        }

        fill(&mut self.field_type, &definition.field_type);
        fill(&mut self.required, &definition.required);
        fill(&mut self.unique, &definition.unique);
        fill(&mut self.primary, &definition.primary);
        fill(&mut self.references, &definition.references);
        fill(&mut self.default, &definition.default);
        fill(&mut self.title, &definition.title);
        fill(&mut self.description, &definition.description);
        fill(&mut self.min_length, &definition.min_length);
        fill(&mut self.max_length, &definition.max_length);
        fill(&mut self.pattern, &definition.pattern);
        fill(&mut self.format, &definition.format);
        fill(&mut self.minimum, &definition.minimum);
        fill(&mut self.maximum, &definition.maximum);
        fill(&mut self.exclusive_minimum, &definition.exclusive_minimum);
        fill(&mut self.exclusive_maximum, &definition.exclusive_maximum);
        fill(&mut self.enum_values, &definition.enum_values);
        fill(&mut self.precision, &definition.precision);
        fill(&mut self.scale, &definition.scale);
        fill(&mut self.items, &definition.items);
        fill(&mut self.quality, &definition.quality);
        fill(&mut self.pii, &definition.pii);
        fill(&mut self.classification, &definition.classification);
        fill(&mut self.example, &definition.example);
        if self.fields.is_empty() {
            self.fields.clone_from(&definition.fields);
        }
        if self.tags.is_empty() {
            self.tags.clone_from(&definition.tags);
        }
    }
}

/// Quality section: a single rule object (older documents) or a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawQualitySection {
    Many(Vec<RawQuality>),
    One(RawQuality),
}

impl RawQualitySection {
    pub fn into_rules(self) -> Vec<RawQuality> {
        match self {
            RawQualitySection::Many(rules) => rules,
            RawQualitySection::One(rule) => vec![rule],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuality {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub rule_type: Option<String>,
    #[serde(alias = "rule")]
    pub metric: Option<String>,
    pub description: Option<String>,
    pub must_be: Option<f64>,
    pub must_be_greater_than: Option<f64>,
    #[serde(alias = "mustBeGreaterOrEqualTo")]
    pub must_be_greater_than_or_equal_to: Option<f64>,
    pub must_be_less_than: Option<f64>,
    #[serde(alias = "mustBeLessOrEqualTo")]
    pub must_be_less_than_or_equal_to: Option<f64>,
    pub must_be_between: Option<Vec<f64>>,
    pub unit: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Deserialize a YAML mapping into `(name, value)` pairs, keeping order
pub(crate) mod named {
    use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use std::fmt;
    use std::marker::PhantomData;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        deserializer.deserialize_any(NamedVisitor(PhantomData))
    }

    struct NamedVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for NamedVisitor<T> {
        type Value = Vec<(String, T)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of names to entries")
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, value)) = map.next_entry::<String, T>()? {
                entries.push((name, value));
            }
            Ok(entries)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_keep_declaration_order() {
        let yaml = r#"
models:
  zebra:
    fields: {}
  alpha:
    fields:
      b: { type: string }
      a: { type: int }
"#;
        let raw: RawContract = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<&str> = raw.models.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zebra", "alpha"]);
        let fields: Vec<&str> = raw.models[1].1.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(fields, vec!["b", "a"]);
    }

    #[test]
    fn test_null_mapping_is_empty() {
        let raw: RawContract = serde_yaml::from_str("models:\n").unwrap();
        assert!(raw.models.is_empty());
    }

    #[test]
    fn test_single_quality_object() {
        let yaml = r#"
quality:
  type: SodaCL
  specification:
    checks for orders:
      - row_count > 10
"#;
        let raw: RawContract = serde_yaml::from_str(yaml).unwrap();
        let rules = raw.quality.unwrap().into_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule_type.as_deref(), Some("SodaCL"));
        assert!(rules[0].extra.contains_key("specification"));
    }

    #[test]
    fn test_inherit_keeps_own_values() {
        let mut field = RawField {
            reference: Some("#/definitions/order_id".to_string()),
            description: Some("Own description".to_string()),
            ..Default::default()
        };
        let definition = RawField {
            field_type: Some("varchar".to_string()),
            description: Some("Definition description".to_string()),
            pattern: Some("^B[0-9]+$".to_string()),
            ..Default::default()
        };
        field.inherit(&definition);
        assert_eq!(field.field_type.as_deref(), Some("varchar"));
        assert_eq!(field.description.as_deref(), Some("Own description"));
        assert_eq!(field.pattern.as_deref(), Some("^B[0-9]+$"));
    }
}
