//! Prelude module for convenient imports.
//!
//! ```
//! use hdm::prelude::*;
//! ```

// Parser
pub use crate::builder::{DecodeOptions, ParserBuilder};
pub use crate::error::{ParserError, Result as ParserResult};
pub use crate::parser::Parser;

// Decoded values
pub use hdm_core::{Complex, DecodeError, EnumMember, FlagSet, NumericArray, ParsedObject, Value};

// Schema
pub use hdm_schema::{FormatError, ObjectDef, Schema, TypeDescriptor};
