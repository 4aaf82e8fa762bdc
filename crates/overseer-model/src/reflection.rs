//! Normalized model reflection.
//!
//! [`ModelInfo`] is everything the subsystem needs to know about one
//! trackable model: its name, backing table, field descriptors in
//! declaration order, and association descriptors. The embedding
//! application's reflection layer builds one `ModelInfo` per model at
//! startup and registers them in a
//! [`ModelRegistry`](crate::registry::ModelRegistry).

use serde::{Deserialize, Serialize};

use crate::associations::{AssociationDescriptor, AssociationKind};
use crate::fields::{is_ignored, pretty_label, FieldDescriptor};

/// Normalized reflection data for one model.
///
/// # Examples
///
/// ```
/// use overseer_model::reflection::ModelInfo;
/// use overseer_model::fields::FieldDescriptor;
///
/// let info = ModelInfo::new("Player", "players")
///     .field(FieldDescriptor::new("id", "BigAutoField").serial())
///     .field(FieldDescriptor::new("name", "CharField").length(100));
/// assert_eq!(info.pretty_name(), "Player");
/// assert_eq!(info.editable_fields().count(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// The model name (e.g. "Player").
    pub name: String,
    /// The backing table name (e.g. "players").
    pub table_name: String,
    /// Field descriptors in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Association descriptors in declaration order.
    pub associations: Vec<AssociationDescriptor>,
}

impl ModelInfo {
    /// Creates an empty `ModelInfo` for a model and its backing table.
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            fields: Vec::new(),
            associations: Vec::new(),
        }
    }

    /// Appends a field descriptor (declaration order matters for diffing).
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends an association descriptor.
    #[must_use]
    pub fn association(mut self, assoc: AssociationDescriptor) -> Self {
        self.associations.push(assoc);
        self
    }

    /// Returns the display form of the model name.
    ///
    /// History rows label their originating entity with this value.
    pub fn pretty_name(&self) -> String {
        pretty_label(&self.name)
    }

    /// Fields that participate in change tracking, declaration order.
    pub fn editable_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !is_ignored(&f.name))
    }

    /// Looks up an association by name.
    pub fn find_association(&self, name: &str) -> Option<&AssociationDescriptor> {
        self.associations.iter().find(|a| a.name == name)
    }

    /// Associations of a given kind.
    pub fn associations_of_kind(
        &self,
        kind: AssociationKind,
    ) -> impl Iterator<Item = &AssociationDescriptor> {
        self.associations.iter().filter(move |a| a.kind == kind)
    }

    /// Many-to-many associations.
    pub fn many_to_many_associations(&self) -> impl Iterator<Item = &AssociationDescriptor> {
        self.associations_of_kind(AssociationKind::ManyToMany)
    }

    /// One-to-many associations.
    pub fn one_to_many_associations(&self) -> impl Iterator<Item = &AssociationDescriptor> {
        self.associations_of_kind(AssociationKind::OneToMany)
    }

    /// One-to-one associations.
    pub fn one_to_one_associations(&self) -> impl Iterator<Item = &AssociationDescriptor> {
        self.associations_of_kind(AssociationKind::OneToOne)
    }

    /// Many-to-one associations.
    pub fn many_to_one_associations(&self) -> impl Iterator<Item = &AssociationDescriptor> {
        self.associations_of_kind(AssociationKind::ManyToOne)
    }
}
