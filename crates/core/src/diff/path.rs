//! Path keys addressing nodes in a contract

use serde::{Serialize, Serializer};
use std::fmt;

/// Dot-rendered address of a node, e.g. `models.orders.fields.order_id`
///
/// Keys are built from names only, so two independently loaded documents
/// produce the same key for the same node regardless of declaration order.
/// Ordering is segment-wise lexicographic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathKey(Vec<String>);

impl PathKey {
    /// Single-segment key
    pub fn root(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Key of a child node
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Proper ancestors, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = PathKey> + '_ {
        (1..self.0.len())
            .rev()
            .map(|len| PathKey(self.0[..len].to_vec()))
    }

    /// Check whether `self` is a proper ancestor of `other`
    pub fn is_ancestor_of(&self, other: &PathKey) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl Serialize for PathKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
