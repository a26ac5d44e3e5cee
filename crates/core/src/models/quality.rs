//! Quality rules attached to contracts, models and fields

use super::relation::Relation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of a quality rule
///
/// The set is closed: the loader rejects metrics it does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityKind {
    /// Bound on the number of rows
    RowCount,
    /// Bound on the number (or percentage) of null values
    NullValues,
    /// Bound on the number of missing values (null or configured sentinels)
    MissingValues,
    /// Bound on duplicated values (uniqueness)
    DuplicateValues,
    /// Bound on values outside the valid set or pattern
    InvalidValues,
    /// Maximum age of the newest record
    Freshness,
    /// Custom SQL expression with a bound on its result
    Sql,
    /// Free text expectation, not executable
    Text,
    /// Engine-specific specification (SodaCL, Great Expectations, ...)
    Custom,
}

impl QualityKind {
    /// Path segment used for unnamed rules of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityKind::RowCount => "row_count",
            QualityKind::NullValues => "null_values",
            QualityKind::MissingValues => "missing_values",
            QualityKind::DuplicateValues => "duplicate_values",
            QualityKind::InvalidValues => "invalid_values",
            QualityKind::Freshness => "freshness",
            QualityKind::Sql => "sql",
            QualityKind::Text => "text",
            QualityKind::Custom => "custom",
        }
    }

    /// Resolve a metric name as written in contract documents
    ///
    /// Accepts both camelCase (`rowCount`) and snake_case (`row_count`).
    pub fn from_metric(metric: &str) -> Option<Self> {
        let normalized: String = metric
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        let kind = match normalized.as_str() {
            "rowcount" => QualityKind::RowCount,
            "nullvalues" => QualityKind::NullValues,
            "missingvalues" => QualityKind::MissingValues,
            "duplicatevalues" => QualityKind::DuplicateValues,
            "invalidvalues" => QualityKind::InvalidValues,
            "freshness" => QualityKind::Freshness,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for QualityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One end of a threshold interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub value: f64,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(value: f64) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    pub fn exclusive(value: f64) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }

    fn scaled(self, factor: f64) -> Self {
        Self {
            value: self.value * factor,
            ..self
        }
    }
}

/// Interval of accepted metric values
///
/// Built from the `mustBe*` keywords of a rule. An empty threshold accepts
/// every value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Threshold {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<Bound>,
}

impl Threshold {
    /// Threshold accepting exactly one value
    pub fn exactly(value: f64) -> Self {
        Self {
            lower: Some(Bound::inclusive(value)),
            upper: Some(Bound::inclusive(value)),
        }
    }

    pub fn at_least(value: f64) -> Self {
        Self {
            lower: Some(Bound::inclusive(value)),
            upper: None,
        }
    }

    pub fn at_most(value: f64) -> Self {
        Self {
            lower: None,
            upper: Some(Bound::inclusive(value)),
        }
    }

    pub fn greater_than(value: f64) -> Self {
        Self {
            lower: Some(Bound::exclusive(value)),
            upper: None,
        }
    }

    pub fn less_than(value: f64) -> Self {
        Self {
            lower: None,
            upper: Some(Bound::exclusive(value)),
        }
    }

    pub fn between(low: f64, high: f64) -> Self {
        Self {
            lower: Some(Bound::inclusive(low)),
            upper: Some(Bound::inclusive(high)),
        }
    }

    /// Check whether the threshold places no restriction
    pub fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    /// Check whether no value can satisfy the threshold
    pub fn is_empty(&self) -> bool {
        match (self.lower, self.upper) {
            (Some(l), Some(u)) => {
                l.value > u.value || (l.value == u.value && !(l.inclusive && u.inclusive))
            }
            _ => false,
        }
    }

    /// Multiply both ends (used to normalize time units)
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            lower: self.lower.map(|b| b.scaled(factor)),
            upper: self.upper.map(|b| b.scaled(factor)),
        }
    }

    /// How `new` relates to `self` as a set of accepted values
    pub fn relation_to(&self, new: &Threshold) -> Relation {
        bound_relation(self.lower, new.lower, true).combine(bound_relation(
            self.upper,
            new.upper,
            false,
        ))
    }
}

/// Keep the tighter of two bounds on the same side of an interval
pub(crate) fn tighter(current: Option<Bound>, candidate: Bound, is_lower: bool) -> Option<Bound> {
    let Some(current) = current else {
        return Some(candidate);
    };
    let keep_current = if current.value == candidate.value {
        !current.inclusive
    } else if is_lower {
        current.value > candidate.value
    } else {
        current.value < candidate.value
    };
    Some(if keep_current { current } else { candidate })
}

/// Relation of two optional bounds, a missing bound is unbounded
pub(crate) fn bound_relation(old: Option<Bound>, new: Option<Bound>, is_lower: bool) -> Relation {
    match (old, new) {
        (None, None) => Relation::Equal,
        (None, Some(_)) => Relation::Narrower,
        (Some(_), None) => Relation::Wider,
        (Some(o), Some(n)) => compare_bounds(o, n, is_lower),
    }
}

/// Compare two bounds on the same side of an interval
fn compare_bounds(old: Bound, new: Bound, is_lower: bool) -> Relation {
    if old.value == new.value {
        return match (old.inclusive, new.inclusive) {
            (a, b) if a == b => Relation::Equal,
            (true, false) => Relation::Narrower,
            _ => Relation::Wider,
        };
    }
    let raised = match new.value.partial_cmp(&old.value) {
        Some(std::cmp::Ordering::Greater) => true,
        Some(_) => false,
        None => return Relation::Incomparable,
    };
    // raising a lower bound or lowering an upper bound narrows the interval
    if raised == is_lower {
        Relation::Narrower
    } else {
        Relation::Wider
    }
}

/// A quality rule (contract, model or field level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityRule {
    /// Optional unique name; named rules are addressed by name when diffing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Rule kind
    pub kind: QualityKind,
    /// Accepted interval for the rule metric
    #[serde(default, skip_serializing_if = "Threshold::is_unbounded")]
    pub threshold: Threshold,
    /// Human readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kind-specific parameters (query, engine, unit, ...), compared opaquely
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl QualityRule {
    /// Create a new rule of the given kind with no threshold
    pub fn new(kind: QualityKind) -> Self {
        Self {
            name: None,
            kind,
            threshold: Threshold::default(),
            description: None,
            params: BTreeMap::new(),
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the threshold
    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}
