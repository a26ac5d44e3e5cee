//! Contract type - the root of a data contract document

use super::model::Model;
use super::quality::QualityRule;
use super::server::Server;
use serde::{Deserialize, Serialize};

/// Default specification version tag for contracts built in code
pub const DEFAULT_SPECIFICATION: &str = "1.1.0";

/// Contact details of the contract owner
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Info block of a contract
///
/// The version is advisory: it is reported when it changes but never
/// influences severity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
}

/// Terms of use
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Terms {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limitations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice_period: Option<String>,
}

/// Contract - the root data contract document
///
/// Models and servers keep their declaration order; names are unique within
/// a contract (the loader rejects duplicates).
///
/// # Example
///
/// ```rust
/// use datacontract_core::models::{Contract, DataType, Field, Model};
///
/// let contract = Contract::new("urn:datacontract:orders", "Orders", "1.0.0")
///     .with_model(
///         Model::new("orders")
///             .with_field(Field::scalar("order_id", DataType::Long).with_required(true)),
///     );
///
/// assert_eq!(contract.model_names(), vec!["orders"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    /// Specification version tag (`dataContractSpecification`)
    pub specification: String,
    /// Contract identifier
    pub id: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<Terms>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub models: Vec<Model>,
    /// Contract-level quality rules
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality: Vec<QualityRule>,
}

impl Contract {
    /// Create a new contract
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            specification: DEFAULT_SPECIFICATION.to_string(),
            id: id.into(),
            info: Info {
                title: title.into(),
                version: version.into(),
                ..Default::default()
            },
            terms: None,
            servers: Vec::new(),
            models: Vec::new(),
            quality: Vec::new(),
        }
    }

    /// Set the specification version tag
    pub fn with_specification(mut self, specification: impl Into<String>) -> Self {
        self.specification = specification.into();
        self
    }

    /// Set the info description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    /// Set the owner
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.info.owner = Some(owner.into());
        self
    }

    /// Set the terms
    pub fn with_terms(mut self, terms: Terms) -> Self {
        self.terms = Some(terms);
        self
    }

    /// Add a server
    pub fn with_server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    /// Add a model
    pub fn with_model(mut self, model: Model) -> Self {
        self.models.push(model);
        self
    }

    /// Set all models
    pub fn with_models(mut self, models: Vec<Model>) -> Self {
        self.models = models;
        self
    }

    /// Add a contract-level quality rule
    pub fn with_quality_rule(mut self, rule: QualityRule) -> Self {
        self.quality.push(rule);
        self
    }

    /// Get a model by name
    pub fn get_model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Get a server by name
    pub fn get_server(&self, name: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.name == name)
    }

    /// Get all model names
    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }
}
