//! Contract comparison and change classification
//!
//! Two contracts are indexed by path, compared structurally and the
//! resulting records classified by severity:
//!
//! 1. [`index`] - path key for every addressable node
//! 2. [`compare`] - added / removed / modified records per attribute group
//! 3. [`classify`] - severity from a static rule table
//! 4. [`changelog`](mod@changelog) - de-duplication, grouping and ordering
//!
//! ## Example
//!
//! ```rust
//! use datacontract_core::config::ChangelogConfig;
//! use datacontract_core::diff::{self, Severity};
//! use datacontract_core::models::{Contract, DataType, Field, Model};
//!
//! let old = Contract::new("urn:orders", "Orders", "1.0.0").with_model(
//!     Model::new("orders")
//!         .with_field(Field::scalar("order_id", DataType::Long))
//!         .with_field(Field::scalar("customer_id", DataType::Long)),
//! );
//! let new = Contract::new("urn:orders", "Orders", "1.1.0").with_model(
//!     Model::new("orders").with_field(Field::scalar("order_id", DataType::Long)),
//! );
//!
//! let changelog = diff::changelog(&old, &new, &ChangelogConfig::default());
//! assert!(changelog.has_breaking());
//! assert_eq!(changelog.filter(Severity::Breaking).len(), 1);
//! ```

pub mod changelog;
pub mod classify;
pub mod compare;
pub mod index;
pub mod path;

pub use changelog::{ChangeGroup, Changelog, Summary};
pub use classify::{ClassifiedChange, Classifier, RULES, Rule, Severity};
pub use compare::{Attribute, Change, ChangeKind, Comparison, EntityKind};
pub use index::{ContractIndex, Node};
pub use path::PathKey;

use crate::config::ChangelogConfig;
use crate::models::Contract;

/// Raw structural differences between two contracts
pub fn diff<'a>(old: &'a Contract, new: &'a Contract) -> Comparison<'a> {
    let old_index = ContractIndex::build(old);
    let new_index = ContractIndex::build(new);
    compare::compare(&old_index, &new_index)
}

/// Classified, de-duplicated and ordered changes
pub fn changelog<'a>(
    old: &'a Contract,
    new: &'a Contract,
    config: &ChangelogConfig,
) -> Changelog<'a> {
    let classifier = Classifier::new(config);
    let classified = diff(old, new)
        .changes
        .into_iter()
        .map(|change| classifier.classify(change))
        .collect();
    Changelog::new(classified)
}

/// Changelog restricted to changes that affect consumers
pub fn breaking<'a>(
    old: &'a Contract,
    new: &'a Contract,
    config: &ChangelogConfig,
) -> Changelog<'a> {
    changelog(old, new, config).filter(Severity::Warning)
}
