//! Schema type definitions.
//!
//! This module contains the compiled form of the header's `"types"` map:
//! primitives, enums, flags, lists/vectors and objects.

use crate::layout::{ObjectDef, SizeSpec};
use hdm_core::ScalarFormat;
use std::collections::HashMap;

/// Compiled schema of one HDM file.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Type definitions in header order.
    pub types: Vec<TypeDescriptor>,
    /// Name of the root (message) type.
    pub message_type: String,
    /// Type lookup map (built during compilation).
    type_map: HashMap<String, usize>,
}

impl Schema {
    /// Creates an empty schema with the given root type name.
    #[must_use]
    pub fn new(message_type: String) -> Self {
        Self {
            types: Vec::new(),
            message_type,
            type_map: HashMap::new(),
        }
    }

    /// Adds a type definition. A name added twice resolves to the later
    /// definition.
    pub fn add_type(&mut self, type_def: TypeDescriptor) {
        let name = type_def.name().to_string();
        let index = self.types.len();
        self.types.push(type_def);
        self.type_map.insert(name, index);
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.type_map.get(name).map(|&idx| &self.types[idx])
    }

    /// Returns true if a type with the given name exists.
    #[must_use]
    pub fn has_type(&self, name: &str) -> bool {
        self.type_map.contains_key(name)
    }

    /// Returns the number of distinct type names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.type_map.len()
    }

    /// Returns true if the schema defines no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.type_map.is_empty()
    }

    /// Returns the root object definition, if the message type names one.
    #[must_use]
    pub fn root(&self) -> Option<&ObjectDef> {
        self.get_type(&self.message_type)
            .and_then(TypeDescriptor::as_object)
    }
}

/// Type definition variants.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// Int, float or complex scalar.
    Primitive(PrimitiveDef),
    /// Integer mapped to a named member.
    Enum(EnumDef),
    /// Integer expanded into named bits.
    Flag(FlagDef),
    /// List or vector of another type.
    Sequence(SequenceDef),
    /// Composite record.
    Object(ObjectDef),
}

impl TypeDescriptor {
    /// Returns the name of the type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Primitive(p) => &p.name,
            Self::Enum(e) => &e.name,
            Self::Flag(f) => &f.name,
            Self::Sequence(s) => &s.name,
            Self::Object(o) => &o.name,
        }
    }

    /// Returns the header tag this type was compiled from.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Primitive(p) if p.format.is_integer() => "int",
            Self::Primitive(p) if p.format.is_complex() => "complex",
            Self::Primitive(_) => "float",
            Self::Enum(_) => "enum",
            Self::Flag(_) => "flag",
            Self::Sequence(s) => s.kind.tag(),
            Self::Object(_) => "object",
        }
    }

    /// Returns true if this is a list or vector type.
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }

    /// Returns the object definition, if this is one.
    #[must_use]
    pub const fn as_object(&self) -> Option<&ObjectDef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Returns the scalar wire format for primitive, enum and flag types.
    #[must_use]
    pub const fn scalar_format(&self) -> Option<ScalarFormat> {
        match self {
            Self::Primitive(p) => Some(p.format),
            Self::Enum(e) => Some(e.format),
            Self::Flag(f) => Some(f.format),
            Self::Sequence(_) | Self::Object(_) => None,
        }
    }
}

/// Int, float or complex type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveDef {
    /// Type name.
    pub name: String,
    /// Wire format.
    pub format: ScalarFormat,
}

impl PrimitiveDef {
    /// Creates a primitive type definition.
    #[must_use]
    pub fn new(name: String, format: ScalarFormat) -> Self {
        Self { name, format }
    }
}

/// Enum type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    /// Type name.
    pub name: String,
    /// Underlying integer format.
    pub format: ScalarFormat,
    /// Members in declaration order.
    pub members: Vec<EnumValue>,
    by_ordinal: HashMap<i64, usize>,
}

impl EnumDef {
    /// Creates an enum with no members.
    #[must_use]
    pub fn new(name: String, format: ScalarFormat) -> Self {
        Self {
            name,
            format,
            members: Vec::new(),
            by_ordinal: HashMap::new(),
        }
    }

    /// Adds a member. An ordinal added twice resolves to the first member,
    /// making the later one an alias.
    pub fn add_member(&mut self, value: EnumValue) {
        let index = self.members.len();
        self.by_ordinal.entry(value.ordinal).or_insert(index);
        self.members.push(value);
    }

    /// Looks up a member by ordinal.
    #[must_use]
    pub fn member(&self, ordinal: i64) -> Option<&EnumValue> {
        self.by_ordinal.get(&ordinal).map(|&idx| &self.members[idx])
    }

    /// Looks up a member by name.
    #[must_use]
    pub fn get_member(&self, name: &str) -> Option<&EnumValue> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Enum member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Member name.
    pub name: String,
    /// Ordinal stored in the payload.
    pub ordinal: i64,
}

impl EnumValue {
    /// Creates an enum member.
    #[must_use]
    pub fn new(name: String, ordinal: i64) -> Self {
        Self { name, ordinal }
    }
}

/// Flag (bitfield) type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDef {
    /// Type name.
    pub name: String,
    /// Underlying integer format.
    pub format: ScalarFormat,
    /// Named bits in declaration order.
    pub bits: Vec<FlagBit>,
}

impl FlagDef {
    /// Creates a flag type with no bits.
    #[must_use]
    pub fn new(name: String, format: ScalarFormat) -> Self {
        Self {
            name,
            format,
            bits: Vec::new(),
        }
    }

    /// Adds a named bit.
    pub fn add_bit(&mut self, bit: FlagBit) {
        self.bits.push(bit);
    }

    /// Looks up a bit by name.
    #[must_use]
    pub fn get_bit(&self, name: &str) -> Option<&FlagBit> {
        self.bits.iter().find(|b| b.name == name)
    }

    /// Tests every named bit against `raw`.
    #[must_use]
    pub fn expand(&self, raw: i64) -> Vec<(String, bool)> {
        self.bits
            .iter()
            .map(|b| (b.name.clone(), raw & b.mask() != 0))
            .collect()
    }
}

/// Named bit of a flag type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagBit {
    /// Flag name.
    pub name: String,
    /// Bit position (0-based).
    pub bit: u32,
}

impl FlagBit {
    /// Creates a named bit.
    #[must_use]
    pub fn new(name: String, bit: u32) -> Self {
        Self { name, bit }
    }

    /// Returns the bit mask for this flag.
    #[must_use]
    pub const fn mask(&self) -> i64 {
        1i64 << self.bit
    }
}

/// List or vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    /// Plain ordered sequence of values.
    List,
    /// Numeric array when the element type is numeric.
    Vector,
}

impl SequenceKind {
    /// Returns the header tag.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Vector => "vector",
        }
    }
}

/// List or vector type definition. Element type and size stay unresolved
/// until decode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceDef {
    /// Type name.
    pub name: String,
    /// List or vector.
    pub kind: SequenceKind,
    /// Element type name.
    pub element: String,
    /// Element count, if the type fixes one.
    pub size: Option<SizeSpec>,
}

impl SequenceDef {
    /// Creates a sequence type definition.
    #[must_use]
    pub fn new(name: String, kind: SequenceKind, element: String, size: Option<SizeSpec>) -> Self {
        Self {
            name,
            kind,
            element,
            size,
        }
    }
}
