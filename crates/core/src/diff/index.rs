//! Path indexing of contract documents

use super::compare::EntityKind;
use super::path::PathKey;
use crate::models::{Contract, Field, Model, QualityKind, QualityRule, Server, Terms};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Borrowed reference to one addressable node of a contract
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    /// Contract identity and info block
    Info(&'a Contract),
    Terms(&'a Terms),
    Server(&'a Server),
    Model(&'a Model),
    Field(&'a Field),
    Quality(&'a QualityRule),
}

impl Node<'_> {
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Node::Info(_) | Node::Terms(_) => EntityKind::Metadata,
            Node::Server(_) => EntityKind::Server,
            Node::Model(_) => EntityKind::Model,
            Node::Field(_) => EntityKind::Field,
            Node::Quality(_) => EntityKind::QualityRule,
        }
    }

    /// Whether other nodes are indexed below this one
    pub fn has_children(&self) -> bool {
        matches!(self, Node::Model(_) | Node::Field(_))
    }
}

impl Serialize for Node<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Info(contract) => contract.info.serialize(serializer),
            Node::Terms(terms) => terms.serialize(serializer),
            Node::Server(server) => server.serialize(serializer),
            Node::Model(model) => model.serialize(serializer),
            Node::Field(field) => field.serialize(serializer),
            Node::Quality(rule) => rule.serialize(serializer),
        }
    }
}

/// Ordered map from path key to node for one contract
#[derive(Debug, Clone, Default)]
pub struct ContractIndex<'a> {
    entries: BTreeMap<PathKey, Node<'a>>,
}

impl<'a> ContractIndex<'a> {
    /// Index every addressable node of a contract
    pub fn build(contract: &'a Contract) -> Self {
        let mut index = Self::default();

        index.insert(PathKey::root("info"), Node::Info(contract));
        if let Some(terms) = &contract.terms {
            index.insert(PathKey::root("terms"), Node::Terms(terms));
        }

        let servers = PathKey::root("servers");
        for server in &contract.servers {
            index.insert(servers.child(&server.name), Node::Server(server));
        }

        let models = PathKey::root("models");
        for model in &contract.models {
            let model_key = models.child(&model.name);
            index.index_fields(&model_key, &model.fields);
            index.index_quality(model_key.child("quality"), &model.quality);
            index.insert(model_key, Node::Model(model));
        }

        index.index_quality(PathKey::root("quality"), &contract.quality);

        debug!("Indexed contract '{}': {} nodes", contract.id, index.len());
        index
    }

    fn insert(&mut self, key: PathKey, node: Node<'a>) {
        if let Some(previous) = self.entries.insert(key.clone(), node) {
            // names are unique per scope after loading; contracts built in
            // code can still collide
            debug!("Path {} indexed twice, replacing {:?}", key, previous.entity_kind());
        }
    }

    fn index_fields(&mut self, parent: &PathKey, fields: &'a [Field]) {
        let scope = parent.child("fields");
        for field in fields {
            let key = scope.child(&field.name);
            self.index_fields(&key, field.nested_fields());
            self.index_quality(key.child("quality"), &field.quality);
            self.insert(key, Node::Field(field));
        }
    }

    /// Named rules are keyed by name, unnamed ones by kind and ordinal
    fn index_quality(&mut self, scope: PathKey, rules: &'a [QualityRule]) {
        let mut ordinals: HashMap<QualityKind, usize> = HashMap::new();
        for rule in rules {
            let key = match &rule.name {
                Some(name) => scope.child(name),
                None => {
                    let ordinal = ordinals.entry(rule.kind).or_insert(0);
                    let key = scope.child(rule.kind.as_str()).child(ordinal.to_string());
                    *ordinal += 1;
                    key
                }
            };
            self.insert(key, Node::Quality(rule));
        }
    }

    pub fn get(&self, key: &PathKey) -> Option<Node<'a>> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &PathKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &PathKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathKey, &Node<'a>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
