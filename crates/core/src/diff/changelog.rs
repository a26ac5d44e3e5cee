//! Changelog aggregation
//!
//! Classified records are de-duplicated (a removed model stands for its
//! removed fields), grouped by path and ordered by severity so the most
//! important changes come first.

use super::classify::{ClassifiedChange, Severity};
use super::compare::{ChangeKind, EntityKind};
use super::path::PathKey;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Number of changes per severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub breaking: usize,
    pub warning: usize,
    pub info: usize,
    pub total: usize,
}

impl Summary {
    fn count(&mut self, severity: Severity) {
        match severity {
            Severity::Breaking => self.breaking += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
        self.total += 1;
    }
}

/// All changes recorded for one path
#[derive(Debug, Clone)]
pub struct ChangeGroup<'c, 'a> {
    pub path: &'c PathKey,
    pub entity: EntityKind,
    /// Highest severity within the group
    pub severity: Severity,
    pub changes: Vec<&'c ClassifiedChange<'a>>,
}

/// Ordered, de-duplicated list of classified changes
#[derive(Debug, Clone, Default)]
pub struct Changelog<'a> {
    changes: Vec<ClassifiedChange<'a>>,
}

impl<'a> Changelog<'a> {
    /// Build a changelog from classified records
    pub fn new(changes: Vec<ClassifiedChange<'a>>) -> Self {
        let mut changes = dedupe(changes);
        sort(&mut changes);
        Self { changes }
    }

    /// All changes, most severe groups first
    pub fn all_changes(&self) -> &[ClassifiedChange<'a>] {
        &self.changes
    }

    /// Changes grouped by path, in changelog order
    pub fn groups(&self) -> Vec<ChangeGroup<'_, 'a>> {
        let mut groups: Vec<ChangeGroup<'_, 'a>> = Vec::new();
        for change in &self.changes {
            match groups.last_mut() {
                Some(group) if *group.path == change.change.path => group.changes.push(change),
                _ => groups.push(ChangeGroup {
                    path: &change.change.path,
                    entity: change.change.entity,
                    severity: change.severity,
                    changes: vec![change],
                }),
            }
        }
        groups
    }

    pub fn has_breaking(&self) -> bool {
        self.changes
            .iter()
            .any(|c| c.severity == Severity::Breaking)
    }

    /// Keep only changes at or above `min_severity`
    pub fn filter(&self, min_severity: Severity) -> Changelog<'a> {
        Changelog {
            changes: self
                .changes
                .iter()
                .filter(|c| c.severity >= min_severity)
                .cloned()
                .collect(),
        }
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for change in &self.changes {
            summary.count(change.severity);
        }
        summary
    }

    /// Gate check: true when no change reaches `fail_on`
    pub fn passes(&self, fail_on: Severity) -> bool {
        !self.changes.iter().any(|c| c.severity >= fail_on)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// Drop records whose ancestor model or field was added or removed as a
/// whole with the same change kind
fn dedupe(changes: Vec<ClassifiedChange<'_>>) -> Vec<ClassifiedChange<'_>> {
    let containers: HashSet<(PathKey, ChangeKind)> = changes
        .iter()
        .filter(|c| c.change.kind != ChangeKind::Modified)
        .filter(|c| {
            c.change
                .old
                .or(c.change.new)
                .is_some_and(|node| node.has_children())
        })
        .map(|c| (c.change.path.clone(), c.change.kind))
        .collect();

    if containers.is_empty() {
        return changes;
    }

    let before = changes.len();
    let kept: Vec<_> = changes
        .into_iter()
        .filter(|c| {
            !c.change
                .path
                .ancestors()
                .any(|ancestor| containers.contains(&(ancestor, c.change.kind)))
        })
        .collect();
    debug!("Suppressed {} records below added/removed containers", before - kept.len());
    kept
}

/// Order groups by (severity desc, entity kind, path) and records within a
/// group by (severity desc, attribute)
fn sort(changes: &mut [ClassifiedChange<'_>]) {
    let mut group_severity: HashMap<PathKey, Severity> = HashMap::new();
    for change in changes.iter() {
        let entry = group_severity
            .entry(change.change.path.clone())
            .or_insert(change.severity);
        *entry = (*entry).max(change.severity);
    }

    changes.sort_by(|a, b| {
        let group_a = group_severity.get(&a.change.path).copied().unwrap_or_default();
        let group_b = group_severity.get(&b.change.path).copied().unwrap_or_default();
        group_b
            .cmp(&group_a)
            .then(a.change.entity.cmp(&b.change.entity))
            .then_with(|| a.change.path.cmp(&b.change.path))
            .then(b.severity.cmp(&a.severity))
            .then(a.change.attribute.cmp(&b.change.attribute))
    });
}

impl Serialize for ClassifiedChange<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let change = &self.change;
        let mut state = serializer.serialize_struct("ClassifiedChange", 9)?;
        state.serialize_field("path", &change.path)?;
        state.serialize_field("entityKind", &change.entity)?;
        state.serialize_field("changeKind", &change.kind)?;
        state.serialize_field("attribute", &change.attribute)?;
        state.serialize_field("severity", &self.severity)?;
        state.serialize_field("rule", self.rule_id())?;
        state.serialize_field("description", &self.description())?;
        state.serialize_field("oldValue", &change.old_value())?;
        state.serialize_field("newValue", &change.new_value())?;
        state.end()
    }
}

impl Serialize for Changelog<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Changelog", 2)?;
        state.serialize_field("summary", &self.summary())?;
        state.serialize_field("changes", &self.changes)?;
        state.end()
    }
}
