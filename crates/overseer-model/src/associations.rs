//! Normalized association metadata.
//!
//! Relationship descriptors reported by the storage layer's reflection API
//! are collapsed onto [`AssociationKind`] and [`AssociationDescriptor`],
//! mirroring the field normalization in [`fields`](crate::fields).

use serde::{Deserialize, Serialize};

use crate::fields::pretty_label;

/// The kind of a model association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssociationKind {
    /// Both sides hold many of the other (via a join table).
    ManyToMany,
    /// This model owns a collection of the related model.
    OneToMany,
    /// Exactly one related record on each side.
    OneToOne,
    /// This model holds a foreign key to the related model.
    ManyToOne,
}

/// Metadata about a single model association, normalized across backends.
///
/// `own_key` names the key fields on this model's side; `related_key` the
/// fields on the related model. For a [`AssociationKind::ManyToOne`]
/// association, the first own-key field is the foreign-key column whose raw
/// value change should be reported as an association change.
///
/// # Examples
///
/// ```
/// use overseer_model::associations::{AssociationDescriptor, AssociationKind};
///
/// let assoc = AssociationDescriptor::new("division", AssociationKind::ManyToOne, "Division")
///     .own_key(vec!["division_id"])
///     .related_key(vec!["id"]);
/// assert_eq!(assoc.foreign_key(), Some("division_id"));
/// assert_eq!(assoc.pretty_name, "Division");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationDescriptor {
    /// The association name as declared on the model.
    pub name: String,
    /// Display form of the name.
    pub pretty_name: String,
    /// The association kind.
    pub kind: AssociationKind,
    /// The related model's name.
    pub related_model: String,
    /// Key field names on this model's side.
    pub own_key: Vec<String>,
    /// Key field names on the related model's side.
    pub related_key: Vec<String>,
}

impl AssociationDescriptor {
    /// Creates a descriptor for an association to `related_model`.
    pub fn new(
        name: impl Into<String>,
        kind: AssociationKind,
        related_model: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let pretty_name = pretty_label(&name);
        Self {
            name,
            pretty_name,
            kind,
            related_model: related_model.into(),
            own_key: Vec::new(),
            related_key: Vec::new(),
        }
    }

    /// Sets the key field names on this model's side.
    #[must_use]
    pub fn own_key(mut self, fields: Vec<&str>) -> Self {
        self.own_key = fields.into_iter().map(String::from).collect();
        self
    }

    /// Sets the key field names on the related model's side.
    #[must_use]
    pub fn related_key(mut self, fields: Vec<&str>) -> Self {
        self.related_key = fields.into_iter().map(String::from).collect();
        self
    }

    /// Returns the foreign-key field name on this model, if any.
    pub fn foreign_key(&self) -> Option<&str> {
        self.own_key.first().map(String::as_str)
    }
}
