//! Change description: diffing two snapshots of a record into a message.
//!
//! [`ChangeSet::diff`] compares the before/after state of one object field
//! by field and association by association; [`ChangeSet::render`] turns the
//! result into the human-readable message the history table stores. Both
//! are pure functions over their inputs.
//!
//! Snapshots are `serde_json::Value` maps keyed by field name, the same
//! generic object representation the adapter layer uses.

use serde_json::Value;

use overseer_model::reflection::ModelInfo;

/// An ordered mapping from association name to the ids of related records.
///
/// Insertion order is preserved; association deltas are reported in the
/// order the sets were captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationSets {
    entries: Vec<(String, Vec<i64>)>,
}

impl AssociationSets {
    /// Creates an empty set collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the id set for an association.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, ids: Vec<i64>) -> Self {
        self.insert(name, ids);
        self
    }

    /// Adds (or replaces) the id set for an association.
    pub fn insert(&mut self, name: impl Into<String>, ids: Vec<i64>) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = ids;
        } else {
            self.entries.push((name, ids));
        }
    }

    /// Returns the id set for an association, if captured.
    pub fn get(&self, name: &str) -> Option<&[i64]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ids)| ids.as_slice())
    }

    /// Iterates over `(name, ids)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[i64])> {
        self.entries
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }
}

/// Membership changes for one association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationDelta {
    /// The association name.
    pub name: String,
    /// Ids present after but not before, in after-order.
    pub added: Vec<i64>,
    /// Ids present before but not after, in before-order.
    pub removed: Vec<i64>,
}

/// The full diff of one update operation.
///
/// Built once per save, rendered into a message, then discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Changed entries in field declaration order, deduplicated. Foreign-key
    /// changes and content-modified associations appear as
    /// `"associated <label>"` entries.
    pub changed: Vec<String>,
    /// Association membership deltas in capture order.
    pub deltas: Vec<AssociationDelta>,
}

impl ChangeSet {
    /// Diffs two snapshots of a record.
    ///
    /// Fields in the model's ignore-set never appear. A changed field that
    /// is some association's foreign key is reported as that association
    /// changing, not as a raw column. `modified_labels` are labels of
    /// associated records whose own content changed as a side effect of
    /// this save; they join the changed list deduplicated.
    pub fn diff(
        model: &ModelInfo,
        old: &Value,
        new: &Value,
        before: &AssociationSets,
        after: &AssociationSets,
        modified_labels: &[String],
    ) -> Self {
        let mut changed: Vec<String> = Vec::new();
        for field in model.editable_fields() {
            if old.get(&field.name) != new.get(&field.name) && !changed.contains(&field.name) {
                changed.push(field.name.clone());
            }
        }

        for assoc in &model.associations {
            if let Some(fk) = assoc.foreign_key() {
                if let Some(pos) = changed.iter().position(|name| name == fk) {
                    changed[pos] = format!("associated {}", assoc.pretty_name);
                }
            }
        }

        let mut deltas: Vec<AssociationDelta> = Vec::new();
        for (name, current) in after.iter() {
            let Some(previous) = before.get(name) else {
                continue;
            };
            let removed: Vec<i64> = previous
                .iter()
                .filter(|id| !current.contains(id))
                .copied()
                .collect();
            let added: Vec<i64> = current
                .iter()
                .filter(|id| !previous.contains(id))
                .copied()
                .collect();
            if !removed.is_empty() || !added.is_empty() {
                deltas.push(AssociationDelta {
                    name: name.to_string(),
                    added,
                    removed,
                });
            }
        }

        for label in modified_labels {
            let entry = format!("associated {label}");
            if !changed.contains(&entry) {
                changed.push(entry);
            }
        }

        Self { changed, deltas }
    }

    /// Returns `true` when the diff found nothing.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deltas.is_empty()
    }

    /// Renders the message fragments and joins them with `", "`.
    ///
    /// Returns `None` when nothing changed; the caller must skip
    /// persistence in that case.
    pub fn render(&self) -> Option<String> {
        let mut messages: Vec<String> = Vec::new();
        for delta in &self.deltas {
            let label = capitalize(&delta.name);
            if !delta.removed.is_empty() {
                messages.push(format!(
                    "Removed {label} {} associations",
                    join_ids(&delta.removed)
                ));
            }
            if !delta.added.is_empty() {
                messages.push(format!(
                    "Added {label} {} associations",
                    join_ids(&delta.added)
                ));
            }
        }
        if !self.changed.is_empty() {
            messages.push(format!("Changed {}", self.changed.join(", ")));
        }
        if messages.is_empty() {
            None
        } else {
            Some(messages.join(", "))
        }
    }
}

/// Diffs and renders in one step.
pub fn describe_update(
    model: &ModelInfo,
    old: &Value,
    new: &Value,
    before: &AssociationSets,
    after: &AssociationSets,
    modified_labels: &[String],
) -> Option<String> {
    ChangeSet::diff(model, old, new, before, after, modified_labels).render()
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
    })
}

/// Formats ids as `#1, #2, #3`.
fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| format!("#{id}"))
        .collect::<Vec<_>>()
        .join(", ")
}
