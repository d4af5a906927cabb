//! # HDM Schema
//!
//! Header reading and type schema compilation for HDM files.
//!
//! This crate provides:
//! - Splitting a file image into header text and binary payload
//! - Evaluation of the header's literal expression
//! - Compilation of the `"types"` map into a [`Schema`]

pub mod builder;
pub mod error;
pub mod header;
pub mod layout;
pub mod literal;
pub mod types;

pub use builder::{build_schema, compile_type};
pub use error::FormatError;
pub use header::{HEADER_SENTINEL, RawHeader, parse_header_text, read_header, strip_comments};
pub use layout::{Condition, Expected, FieldLayoutEntry, ObjectDef, SizeSpec};
pub use literal::{Literal, parse_literal};
pub use types::{
    EnumDef, EnumValue, FlagBit, FlagDef, PrimitiveDef, Schema, SequenceDef, SequenceKind,
    TypeDescriptor,
};
