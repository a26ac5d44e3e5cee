//! Server connection descriptors

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Server type tag
///
/// Known platforms get their own variant; anything else is kept verbatim in
/// [`ServerType::Other`]. Servers are compared shallowly, so the variant only
/// matters for equality and display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerType {
    S3,
    Gcs,
    Azure,
    BigQuery,
    Snowflake,
    Databricks,
    Redshift,
    Postgres,
    SqlServer,
    Oracle,
    Trino,
    Kafka,
    PubSub,
    Kinesis,
    Local,
    Other(String),
}

impl ServerType {
    /// Parse a server type tag, case-insensitively
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "s3" => ServerType::S3,
            "gcs" => ServerType::Gcs,
            "azure" => ServerType::Azure,
            "bigquery" => ServerType::BigQuery,
            "snowflake" => ServerType::Snowflake,
            "databricks" => ServerType::Databricks,
            "redshift" => ServerType::Redshift,
            "postgres" | "postgresql" => ServerType::Postgres,
            "sqlserver" => ServerType::SqlServer,
            "oracle" => ServerType::Oracle,
            "trino" => ServerType::Trino,
            "kafka" => ServerType::Kafka,
            "pubsub" => ServerType::PubSub,
            "kinesis" => ServerType::Kinesis,
            "local" => ServerType::Local,
            _ => ServerType::Other(tag.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ServerType::S3 => "s3",
            ServerType::Gcs => "gcs",
            ServerType::Azure => "azure",
            ServerType::BigQuery => "bigquery",
            ServerType::Snowflake => "snowflake",
            ServerType::Databricks => "databricks",
            ServerType::Redshift => "redshift",
            ServerType::Postgres => "postgres",
            ServerType::SqlServer => "sqlserver",
            ServerType::Oracle => "oracle",
            ServerType::Trino => "trino",
            ServerType::Kafka => "kafka",
            ServerType::PubSub => "pubsub",
            ServerType::Kinesis => "kinesis",
            ServerType::Local => "local",
            ServerType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ServerType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ServerType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ServerType::parse(&tag))
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Server name (key in the contract's `servers` mapping)
    pub name: String,
    #[serde(rename = "type")]
    pub server_type: ServerType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Type-specific parameters (host, location, format, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl Server {
    /// Create a new server
    pub fn new(name: impl Into<String>, server_type: ServerType) -> Self {
        Self {
            name: name.into(),
            server_type,
            description: None,
            params: BTreeMap::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a string parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .insert(key.into(), serde_json::Value::String(value.into()));
        self
    }
}
