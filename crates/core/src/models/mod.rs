//! Contract document model
//!
//! Closed, typed representation of a data contract. The loader converts the
//! loosely-typed YAML document into these types once; everything downstream
//! (indexing, comparison, classification, lint) only sees this model.
//!
//! The hierarchy follows the document:
//!
//! 1. **Contract** ([`Contract`]) - info, terms, servers, models, quality
//! 2. **Model** ([`Model`]) - one dataset with fields and quality rules
//! 3. **Field** ([`Field`]) - scalar or nested, recursively
//!
//! ## Example
//!
//! ```rust
//! use datacontract_core::models::{
//!     Contract, DataType, Field, Model, QualityKind, QualityRule, Threshold,
//! };
//!
//! let contract = Contract::new("urn:datacontract:checkout", "Checkout", "1.0.0")
//!     .with_model(
//!         Model::new("orders")
//!             .with_model_type("table")
//!             .with_fields(vec![
//!                 Field::scalar("order_id", DataType::Long)
//!                     .with_required(true)
//!                     .with_primary(true),
//!                 Field::scalar("customer_id", DataType::Long).with_required(true),
//!             ])
//!             .with_quality_rule(
//!                 QualityRule::new(QualityKind::RowCount)
//!                     .with_threshold(Threshold::at_least(1.0)),
//!             ),
//!     );
//!
//! assert_eq!(contract.models.len(), 1);
//! ```

pub mod contract;
pub mod field;
pub mod model;
pub mod quality;
pub mod relation;
pub mod server;
pub mod types;

pub use contract::{Contact, Contract, Info, Terms};
pub use field::{Constraints, Container, Field, FieldKind, FieldMetadata};
pub use model::Model;
pub use quality::{Bound, QualityKind, QualityRule, Threshold};
pub use relation::Relation;
pub use server::{Server, ServerType};
pub use types::{Compatibility, DataType, UnknownDataType};
