//! Contract document loading
//!
//! Reads Data Contract Specification YAML from a string, a local path or an
//! http(s) URL and converts it into a [`Contract`]. `$ref` pointers to
//! `#/definitions/...` or to external documents are inlined before
//! conversion when enabled in [`LoaderConfig`].
//!
//! ## Example
//!
//! ```rust
//! use datacontract_core::config::LoaderConfig;
//! use datacontract_core::loader::ContractLoader;
//!
//! let yaml = r#"
//! dataContractSpecification: 1.1.0
//! id: urn:datacontract:checkout
//! info:
//!   title: Checkout
//!   version: 1.0.0
//! models:
//!   orders:
//!     type: table
//!     fields:
//!       order_id:
//!         type: bigint
//!         required: true
//! "#;
//!
//! let contract = ContractLoader::new(LoaderConfig::default()).load_str(yaml).unwrap();
//! assert_eq!(contract.model_names(), vec!["orders"]);
//! ```

mod convert;
pub mod error;
pub mod fetch;
pub mod raw;
mod resolve;

pub use error::LoadError;
pub use fetch::{LocationFetcher, ResourceFetcher};

use crate::config::LoaderConfig;
use crate::models::Contract;
use convert::Converter;
use raw::RawContract;
use resolve::DefinitionResolver;
use tracing::info;

/// Loads contract documents
pub struct ContractLoader {
    config: LoaderConfig,
    fetcher: Box<dyn ResourceFetcher>,
}

impl ContractLoader {
    /// Create a loader reading local files and http(s) URLs
    pub fn new(config: LoaderConfig) -> Self {
        let fetcher = LocationFetcher::new(config.http_timeout());
        Self {
            config,
            fetcher: Box::new(fetcher),
        }
    }

    /// Create a loader with a custom fetcher
    pub fn with_fetcher(config: LoaderConfig, fetcher: impl ResourceFetcher + 'static) -> Self {
        Self {
            config,
            fetcher: Box::new(fetcher),
        }
    }

    /// Load a contract from a local path or http(s) URL
    pub fn load(&self, location: &str) -> Result<Contract, LoadError> {
        let content = self.fetcher.fetch(location)?;
        let contract = self.parse(&content, Some(location))?;
        info!(
            "Loaded contract '{}' from {} ({} models)",
            contract.id,
            location,
            contract.models.len()
        );
        Ok(contract)
    }

    /// Load a contract from YAML text
    ///
    /// Only http(s) references can be followed without a document location.
    pub fn load_str(&self, content: &str) -> Result<Contract, LoadError> {
        self.parse(content, None)
    }

    fn parse(&self, content: &str, location: Option<&str>) -> Result<Contract, LoadError> {
        if content.trim().is_empty() {
            return Err(LoadError::Yaml("document is empty".to_string()));
        }
        let mut raw: RawContract = serde_yaml::from_str(content)?;
        let definitions = std::mem::take(&mut raw.definitions);

        let resolver = DefinitionResolver::new(&definitions, self.fetcher.as_ref(), location);
        Converter::new(&resolver, &self.config).convert(raw)
    }
}

impl Default for ContractLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Container, DataType, FieldKind, QualityKind};

    fn load(yaml: &str) -> Result<Contract, LoadError> {
        ContractLoader::default().load_str(yaml)
    }

    #[test]
    fn test_load_minimal() {
        let contract = load(
            r#"
id: orders
info:
  title: Orders
  version: 1.0.0
"#,
        )
        .unwrap();
        assert_eq!(contract.id, "orders");
        assert_eq!(contract.info.version, "1.0.0");
        assert!(contract.models.is_empty());
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(load("  \n"), Err(LoadError::Yaml(_))));
    }

    #[test]
    fn test_aliases_normalized() {
        let contract = load(
            r#"
models:
  orders:
    fields:
      id: { type: bigint }
      note: { type: text }
      amount: { type: numeric, precision: 10, scale: 2 }
"#,
        )
        .unwrap();
        let orders = contract.get_model("orders").unwrap();
        assert_eq!(orders.get_field("id").unwrap().data_type(), Some(&DataType::Long));
        assert_eq!(orders.get_field("note").unwrap().data_type(), Some(&DataType::String));
        assert_eq!(
            orders.get_field("amount").unwrap().data_type(),
            Some(&DataType::Decimal {
                precision: Some(10),
                scale: Some(2)
            })
        );
    }

    #[test]
    fn test_nested_fields() {
        let contract = load(
            r#"
models:
  customers:
    fields:
      address:
        type: object
        fields:
          street: { type: string }
      orders:
        type: array
        items:
          type: object
          fields:
            order_id: { type: long }
      tags:
        type: array
        items:
          type: string
"#,
        )
        .unwrap();
        let customers = contract.get_model("customers").unwrap();
        let address = customers.get_field("address").unwrap();
        assert!(matches!(
            address.kind,
            FieldKind::Nested {
                container: Container::Object,
                ..
            }
        ));
        let orders = customers.get_field("orders").unwrap();
        assert!(matches!(
            orders.kind,
            FieldKind::Nested {
                container: Container::Array,
                ..
            }
        ));
        assert_eq!(orders.nested_fields()[0].name, "order_id");
        assert_eq!(
            customers.get_field("tags").unwrap().data_type(),
            Some(&DataType::Array(Some(Box::new(DataType::String))))
        );
    }

    #[test]
    fn test_duplicate_model_rejected() {
        let err = load(
            r#"
models:
  orders: { fields: {} }
  orders: { fields: {} }
"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            LoadError::DuplicateName {
                scope: "models".to_string(),
                kind: "model",
                name: "orders".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_type() {
        let err = load("models:\n  orders:\n    fields:\n      id: { type: uuidish }\n")
            .unwrap_err();
        assert_eq!(
            err,
            LoadError::UnknownType {
                path: "models.orders.fields.id".to_string(),
                type_name: "uuidish".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_type() {
        let err = load("models:\n  orders:\n    fields:\n      id: { required: true }\n")
            .unwrap_err();
        assert!(matches!(err, LoadError::MissingType { .. }));
    }

    #[test]
    fn test_nested_with_constraints_rejected() {
        let err = load(
            r#"
models:
  orders:
    fields:
      address:
        type: object
        maxLength: 10
        fields:
          street: { type: string }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::ConflictingShape { .. }));
    }

    #[test]
    fn test_definitions_inlined() {
        let yaml = r##"
definitions:
  order_id:
    type: varchar
    pattern: "^B[0-9]+$"
    description: Order identifier
models:
  orders:
    fields:
      order_id:
        $ref: "#/definitions/order_id"
        required: true
"##;
        let contract = load(yaml).unwrap();
        let field = contract.get_model("orders").unwrap().get_field("order_id").unwrap();
        assert_eq!(field.data_type(), Some(&DataType::Varchar));
        assert!(field.required);
        assert_eq!(
            field.constraints().unwrap().pattern.as_deref(),
            Some("^B[0-9]+$")
        );

        let without = ContractLoader::new(LoaderConfig::default().with_inline_definitions(false))
            .load_str(yaml)
            .unwrap_err();
        assert!(matches!(without, LoadError::MissingType { .. }));
    }

    #[test]
    fn test_quality_rules_at_all_levels() {
        let contract = load(
            r#"
quality:
  - type: text
    description: Orders are complete
models:
  orders:
    quality:
      - type: library
        metric: rowCount
        mustBeGreaterThan: 0
    fields:
      email:
        type: string
        quality:
          - metric: nullValues
            mustBe: 0
"#,
        )
        .unwrap();
        assert_eq!(contract.quality[0].kind, QualityKind::Text);
        let orders = contract.get_model("orders").unwrap();
        assert_eq!(orders.quality[0].kind, QualityKind::RowCount);
        assert_eq!(
            orders.get_field("email").unwrap().quality[0].kind,
            QualityKind::NullValues
        );
    }

    #[test]
    fn test_enum_values_canonicalized() {
        let contract = load(
            r#"
models:
  orders:
    fields:
      status:
        type: string
        enum: [shipped, pending]
"#,
        )
        .unwrap();
        let status = contract.get_model("orders").unwrap().get_field("status").unwrap();
        let values: Vec<&str> = status
            .constraints()
            .unwrap()
            .enum_values
            .as_ref()
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(values, vec!["\"pending\"", "\"shipped\""]);
    }
}
