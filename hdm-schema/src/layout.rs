//! Object layouts.
//!
//! An object type is an ordered list of [`FieldLayoutEntry`]s. Each entry
//! reads one value (or one run of values) and assigns it to one or more
//! field names. Entries may be conditional on a sibling decoded earlier in
//! the same object, and may take their element count from such a sibling.

use std::fmt;

/// Object type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDef {
    /// Type name.
    pub name: String,
    /// Entries in declaration order.
    pub layout: Vec<FieldLayoutEntry>,
}

impl ObjectDef {
    /// Creates an object definition with an empty layout.
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            name,
            layout: Vec::new(),
        }
    }

    /// Appends an entry to the layout.
    pub fn add_entry(&mut self, entry: FieldLayoutEntry) {
        self.layout.push(entry);
    }

    /// Returns every field name declared by the layout, in order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.layout
            .iter()
            .flat_map(|e| e.field_names.iter().map(String::as_str))
            .collect()
    }
}

/// One entry of an object layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayoutEntry {
    /// Referenced type name.
    pub type_name: String,
    /// Field names receiving the decoded value.
    pub field_names: Vec<String>,
    /// Presence condition on an earlier sibling.
    pub condition: Option<Condition>,
    /// Element count override.
    pub size: Option<SizeSpec>,
}

impl FieldLayoutEntry {
    /// Creates an unconditional, unsized entry.
    #[must_use]
    pub fn new(type_name: String, field_names: Vec<String>) -> Self {
        Self {
            type_name,
            field_names,
            condition: None,
            size: None,
        }
    }

    /// Returns the first field name, used in diagnostics.
    #[must_use]
    pub fn primary_name(&self) -> &str {
        self.field_names.first().map_or("", String::as_str)
    }
}

/// Presence condition: the entry is decoded only if `field` matches
/// `expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Sibling field tested.
    pub field: String,
    /// Value the sibling must match.
    pub expected: Expected,
}

/// Expected value of a [`Condition`].
///
/// A name matches an enum member by name, or a flag set by testing that
/// flag. Integers and booleans compare by equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// Enum member name or flag name.
    Name(String),
    /// Integer value.
    Int(i64),
    /// Boolean value.
    Bool(bool),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(n) => write!(f, "'{n}'"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
        }
    }
}

/// Element count of a list, vector or sized entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeSpec {
    /// Literal count.
    Fixed(usize),
    /// Count held by an earlier sibling field.
    Field(String),
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Field(name) => write!(f, "'{name}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_field_names_flatten_entries() {
        let mut obj = ObjectDef::new("Ray".to_string());
        obj.add_entry(FieldLayoutEntry::new(
            "f32".to_string(),
            vec!["x".to_string(), "x_copy".to_string()],
        ));
        obj.add_entry(FieldLayoutEntry::new("u8".to_string(), vec!["y".to_string()]));
        assert_eq!(obj.field_names(), vec!["x", "x_copy", "y"]);
        assert_eq!(obj.layout[0].primary_name(), "x");
    }

    #[test]
    fn test_display() {
        assert_eq!(Expected::Name("A".to_string()).to_string(), "'A'");
        assert_eq!(Expected::Bool(true).to_string(), "True");
        assert_eq!(SizeSpec::Fixed(3).to_string(), "3");
        assert_eq!(SizeSpec::Field("n".to_string()).to_string(), "'n'");
    }
}
