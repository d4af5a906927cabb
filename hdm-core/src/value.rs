//! Decoded value tree.
//!
//! A payload decodes into a tree of [`Value`]s rooted at a [`ParsedObject`].
//! The set of variants is closed; the shape of each object is given by the
//! schema embedded in the file header.

use std::collections::HashMap;
use std::fmt;

/// Complex number decoded from two consecutive floats.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex {
    /// Creates a complex value.
    #[must_use]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im.is_sign_negative() {
            write!(f, "({}-{}j)", self.re, -self.im)
        } else {
            write!(f, "({}+{}j)", self.re, self.im)
        }
    }
}

/// Homogeneous run of numbers produced by a single batched read.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum NumericArray {
    /// Integers, widened to i64.
    Int(Vec<i64>),
    /// Floats, widened to f64.
    Float(Vec<f64>),
    /// Complex values.
    Complex(Vec<Complex>),
}

impl NumericArray {
    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Complex(v) => v.len(),
        }
    }

    /// Returns true if there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns element `index` as a scalar value.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Self::Int(v) => v.get(index).map(|&x| Value::Int(x)),
            Self::Float(v) => v.get(index).map(|&x| Value::Float(x)),
            Self::Complex(v) => v.get(index).map(|&x| Value::Complex(x)),
        }
    }

    /// Splits the array into one scalar value per element.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Self::Int(v) => v.into_iter().map(Value::Int).collect(),
            Self::Float(v) => v.into_iter().map(Value::Float).collect(),
            Self::Complex(v) => v.into_iter().map(Value::Complex).collect(),
        }
    }
}

/// Member of a schema-defined enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumMember {
    /// Enum type name.
    pub type_name: String,
    /// Member name.
    pub name: String,
    /// Ordinal as stored in the payload.
    pub ordinal: i64,
}

impl fmt::Display for EnumMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.name)
    }
}

/// Bit-flag value expanded into named booleans.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlagSet {
    type_name: String,
    raw: i64,
    flags: Vec<(String, bool)>,
}

impl FlagSet {
    /// Creates a flag set from its raw integer and the expanded flags.
    #[must_use]
    pub fn new(type_name: impl Into<String>, raw: i64, flags: Vec<(String, bool)>) -> Self {
        Self {
            type_name: type_name.into(),
            raw,
            flags,
        }
    }

    /// Returns the flag type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the raw integer read from the payload.
    #[must_use]
    pub const fn raw(&self) -> i64 {
        self.raw
    }

    /// Looks up one flag. `None` if the type does not define it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<bool> {
        self.flags.iter().find(|(n, _)| n == name).map(|&(_, set)| set)
    }

    /// Returns true if the named flag is defined and set.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).unwrap_or(false)
    }

    /// Iterates flags in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(n, set)| (n.as_str(), *set))
    }

    /// Returns the names of the flags that are set.
    #[must_use]
    pub fn set_names(&self) -> Vec<&str> {
        self.iter()
            .filter_map(|(n, set)| if set { Some(n) } else { None })
            .collect()
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name, self.set_names().join("|"))
    }
}

/// Instance of an object type: named fields in layout order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedObject {
    type_name: String,
    fields: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl ParsedObject {
    /// Creates an empty object of the given type.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the object type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Sets a field. A name assigned twice keeps its first position and
    /// takes the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&idx) => self.fields[idx].1 = value,
            None => {
                self.index.insert(name.clone(), self.fields.len());
                self.fields.push((name, value));
            }
        }
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.index.get(name).map(|&idx| &self.fields[idx].1)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the object has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns field names in layout order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }
}

/// A decoded value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Value {
    /// Placeholder for an optional field whose condition was false.
    Null,
    /// Integer primitive.
    Int(i64),
    /// Float primitive.
    Float(f64),
    /// Complex primitive.
    Complex(Complex),
    /// Enum member.
    Enum(EnumMember),
    /// Expanded bit flags.
    Flags(FlagSet),
    /// Ordered sequence of values.
    List(Vec<Value>),
    /// Batched numeric vector.
    Array(NumericArray),
    /// Nested object.
    Object(ParsedObject),
}

impl Value {
    /// Returns a short name of the variant for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Complex(_) => "complex",
            Self::Enum(_) => "enum",
            Self::Flags(_) => "flags",
            Self::List(_) => "list",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Returns true for the null placeholder.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as f64 for ints and floats.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the complex value, if this is one.
    #[must_use]
    pub const fn as_complex(&self) -> Option<Complex> {
        match self {
            Self::Complex(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the enum member, if this is one.
    #[must_use]
    pub const fn as_enum(&self) -> Option<&EnumMember> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the flag set, if this is one.
    #[must_use]
    pub const fn as_flags(&self) -> Option<&FlagSet> {
        match self {
            Self::Flags(f) => Some(f),
            _ => None,
        }
    }

    /// Returns the list, if this is one.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the numeric array, if this is one.
    #[must_use]
    pub const fn as_array(&self) -> Option<&NumericArray> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the nested object, if this is one.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ParsedObject> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Looks up a field when this value is an object.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_object().and_then(|o| o.get(field))
    }
}

impl From<ParsedObject> for Value {
    fn from(obj: ParsedObject) -> Self {
        Self::Object(obj)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("None"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Complex(c) => write!(f, "{c}"),
            Self::Enum(e) => write!(f, "{e}"),
            Self::Flags(flags) => write!(f, "{flags}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Array(arr) => {
                f.write_str("array([")?;
                for i in 0..arr.len() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if let Some(item) = arr.get(i) {
                        write!(f, "{item}")?;
                    }
                }
                f.write_str("])")
            }
            Self::Object(obj) => write!(f, "{obj}"),
        }
    }
}

impl fmt::Display for ParsedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::{EnumMember, FlagSet, ParsedObject};
    use serde::ser::{Serialize, SerializeMap, Serializer};

    impl Serialize for EnumMember {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.name)
        }
    }

    impl Serialize for FlagSet {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.flags.len()))?;
            for (name, set) in &self.flags {
                map.serialize_entry(name, set)?;
            }
            map.end()
        }
    }

    impl Serialize for ParsedObject {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.fields.len()))?;
            for (name, value) in &self.fields {
                map.serialize_entry(name, value)?;
            }
            map.end()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_insert_and_get() {
        let mut obj = ParsedObject::new("Point");
        obj.insert("x", Value::Int(3));
        obj.insert("y", Value::Int(4));
        assert_eq!(obj.type_name(), "Point");
        assert_eq!(obj.len(), 2);
        assert_eq!(obj.get("x"), Some(&Value::Int(3)));
        assert_eq!(obj.get("z"), None);
        assert_eq!(obj.field_names(), vec!["x", "y"]);
    }

    #[test]
    fn test_object_reinsert_keeps_position() {
        let mut obj = ParsedObject::new("T");
        obj.insert("a", Value::Int(1));
        obj.insert("b", Value::Int(2));
        obj.insert("a", Value::Null);
        assert_eq!(obj.field_names(), vec!["a", "b"]);
        assert!(obj.get("a").is_some_and(Value::is_null));
    }

    #[test]
    fn test_flag_set_lookup() {
        let flags = FlagSet::new(
            "Mode",
            0b101,
            vec![
                ("A".to_string(), true),
                ("B".to_string(), false),
                ("C".to_string(), true),
            ],
        );
        assert_eq!(flags.get("A"), Some(true));
        assert_eq!(flags.get("B"), Some(false));
        assert_eq!(flags.get("D"), None);
        assert!(!flags.is_set("D"));
        assert_eq!(flags.set_names(), vec!["A", "C"]);
        assert_eq!(flags.to_string(), "Mode(A|C)");
    }

    #[test]
    fn test_numeric_array_access() {
        let arr = NumericArray::Float(vec![1.0, 2.5]);
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.get(1), Some(Value::Float(2.5)));
        assert_eq!(arr.get(2), None);
        assert_eq!(
            NumericArray::Int(vec![1, 2]).into_values(),
            vec![Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::Int(7).as_float(), Some(7.0));
        assert_eq!(Value::Float(0.5).as_int(), None);
        assert!(Value::Null.is_null());
        assert_eq!(Value::Null.kind(), "null");

        let mut obj = ParsedObject::new("P");
        obj.insert("x", Value::Int(1));
        let value = Value::from(obj);
        assert_eq!(value.get("x"), Some(&Value::Int(1)));
        assert_eq!(Value::Int(1).get("x"), None);
    }

    #[test]
    fn test_display() {
        let mut obj = ParsedObject::new("Point");
        obj.insert("x", Value::Int(3));
        obj.insert("c", Value::Complex(Complex::new(1.0, -2.0)));
        obj.insert("l", Value::List(vec![Value::Int(1), Value::Null]));
        assert_eq!(obj.to_string(), "Point(x=3, c=(1-2j), l=[1, None])");
    }
}
