//! Direction of a change to a set of allowed values
//!
//! Constraints and quality thresholds both describe a domain of accepted
//! values. When one changes, the classifier needs to know whether the new
//! domain is a subset (tightened), a superset (relaxed) or neither.

use serde::{Deserialize, Serialize};

/// How a new value domain relates to the old one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Same domain
    Equal,
    /// New domain is a strict subset of the old one
    Narrower,
    /// New domain is a strict superset of the old one
    Wider,
    /// Neither contains the other
    Incomparable,
}

impl Relation {
    /// Combine the relations of two independent dimensions of the same domain
    pub fn combine(self, other: Relation) -> Relation {
        use Relation::*;
        match (self, other) {
            (Equal, r) | (r, Equal) => r,
            (Narrower, Narrower) => Narrower,
            (Wider, Wider) => Wider,
            _ => Incomparable,
        }
    }

    /// Fold any number of per-dimension relations
    pub fn all(relations: impl IntoIterator<Item = Relation>) -> Relation {
        relations
            .into_iter()
            .fold(Relation::Equal, |acc, r| acc.combine(r))
    }

    /// Relation between two optional lower limits (larger = narrower)
    pub fn of_lower<T: PartialOrd>(old: Option<T>, new: Option<T>) -> Relation {
        match (old, new) {
            (None, None) => Relation::Equal,
            (None, Some(_)) => Relation::Narrower,
            (Some(_), None) => Relation::Wider,
            (Some(o), Some(n)) => ordering_relation(n.partial_cmp(&o)),
        }
    }

    /// Relation between two optional upper limits (smaller = narrower)
    pub fn of_upper<T: PartialOrd>(old: Option<T>, new: Option<T>) -> Relation {
        match (old, new) {
            (None, None) => Relation::Equal,
            (None, Some(_)) => Relation::Narrower,
            (Some(_), None) => Relation::Wider,
            (Some(o), Some(n)) => ordering_relation(o.partial_cmp(&n)),
        }
    }

    /// Relation between two optional opaque restrictions (e.g. a pattern)
    pub fn of_restriction<T: PartialEq>(old: Option<&T>, new: Option<&T>) -> Relation {
        match (old, new) {
            (None, None) => Relation::Equal,
            (None, Some(_)) => Relation::Narrower,
            (Some(_), None) => Relation::Wider,
            (Some(o), Some(n)) if o == n => Relation::Equal,
            _ => Relation::Incomparable,
        }
    }
}

fn ordering_relation(ordering: Option<std::cmp::Ordering>) -> Relation {
    match ordering {
        Some(std::cmp::Ordering::Equal) => Relation::Equal,
        Some(std::cmp::Ordering::Greater) => Relation::Narrower,
        Some(std::cmp::Ordering::Less) => Relation::Wider,
        None => Relation::Incomparable,
    }
}
