//! Normalized field metadata.
//!
//! Every storage backend exposes its own column/property type tags; this
//! module maps them onto one small [`FieldType`] enum at the adapter
//! boundary, so the rest of the subsystem never inspects backend types.
//! [`FieldDescriptor`] is the normalized shape of one model property.

use serde::{Deserialize, Serialize};

/// Field names excluded from change tracking.
///
/// Primary keys and store-managed timestamps change on every save and
/// would drown out the interesting diffs.
pub const IGNORED_FIELDS: [&str; 7] = [
    "id",
    "created_at",
    "created_on",
    "updated_at",
    "updated_on",
    "deleted_at",
    "deleted_on",
];

/// Returns `true` if a field is excluded from change tracking.
pub fn is_ignored(name: &str) -> bool {
    IGNORED_FIELDS.contains(&name)
}

/// Formats a field, association, or model name for display.
///
/// Underscores become spaces, the first character is upper-cased and the
/// rest lower-cased: `"fan_clubs"` becomes `"Fan clubs"`.
pub fn pretty_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
    })
}

/// The normalized type of a model field.
///
/// Backend-specific tags collapse onto these ten variants via
/// [`FieldType::from_backend_tag`]; anything unrecognized is treated as a
/// plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Raw binary data.
    Binary,
    /// True/false.
    Boolean,
    /// Date without time.
    Date,
    /// Date and time.
    DateTime,
    /// Fixed-precision decimal.
    Decimal,
    /// Floating-point number.
    Float,
    /// Signed integer of any width.
    Integer,
    /// Bounded-length string.
    String,
    /// Unbounded text.
    Text,
    /// Time without date.
    Time,
}

impl FieldType {
    /// Maps a backend type tag onto a normalized `FieldType`.
    ///
    /// The tags are whatever strings the storage layer's reflection API
    /// reports for its column types. The table is fixed; unknown tags map
    /// to [`FieldType::String`].
    pub fn from_backend_tag(tag: &str) -> Self {
        match tag {
            "BinaryField" => Self::Binary,
            "BooleanField" => Self::Boolean,
            "DateField" => Self::Date,
            "DateTimeField" => Self::DateTime,
            "DecimalField" => Self::Decimal,
            "FloatField" => Self::Float,
            "AutoField" | "BigAutoField" | "IntegerField" | "BigIntegerField"
            | "SmallIntegerField" => Self::Integer,
            "TextField" => Self::Text,
            "TimeField" => Self::Time,
            _ => Self::String,
        }
    }
}

/// Metadata about a single model field, normalized across backends.
///
/// # Examples
///
/// ```
/// use overseer_model::fields::{FieldDescriptor, FieldType};
///
/// let field = FieldDescriptor::new("team_name", "CharField")
///     .length(100)
///     .nullable();
/// assert_eq!(field.pretty_name, "Team name");
/// assert_eq!(field.field_type, FieldType::String);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// The field name as declared on the model.
    pub name: String,
    /// Display form of the name.
    pub pretty_name: String,
    /// The normalized field type.
    pub field_type: FieldType,
    /// Maximum length, when the backend reports one.
    pub length: Option<u32>,
    /// Whether the field accepts null values.
    pub nullable: bool,
    /// Whether the field is an auto-generated serial primary key.
    pub serial: bool,
}

impl FieldDescriptor {
    /// Creates a descriptor from a field name and the backend's type tag.
    pub fn new(name: impl Into<String>, backend_tag: &str) -> Self {
        let name = name.into();
        let pretty_name = pretty_label(&name);
        Self {
            name,
            pretty_name,
            field_type: FieldType::from_backend_tag(backend_tag),
            length: None,
            nullable: false,
            serial: false,
        }
    }

    /// Sets the maximum length.
    #[must_use]
    pub const fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Marks the field as nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the field as a serial primary key.
    #[must_use]
    pub const fn serial(mut self) -> Self {
        self.serial = true;
        self
    }
}
