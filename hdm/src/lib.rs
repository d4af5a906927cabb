//! # HDM
//!
//! Reader for self-describing HDM binary files.
//!
//! An HDM file starts with a textual header: a literal dict describing every
//! type in the file and naming the root message type, terminated by the line
//! `#header end`. The rest of the file is a little-endian payload holding one
//! instance of the root type. The header is compiled into a [`Schema`] and
//! the payload is decoded against it into a [`ParsedObject`] tree.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hdm::prelude::*;
//!
//! # fn main() -> hdm::Result<()> {
//! let mut parser = Parser::open("capture.hdm")?;
//! let message = parser.parse_message()?;
//! println!("{message}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Cursor, scalar formats, decoded values
//! - [`schema`] - Header parsing and schema compilation

pub mod builder;
pub mod convert;
pub mod error;
pub mod materializer;
pub mod parser;
pub mod prelude;

/// Cursor, scalar formats and decoded values.
pub mod core {
    pub use hdm_core::*;
}

/// Header parsing and schema compilation.
pub mod schema {
    pub use hdm_schema::*;
}

pub use builder::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_ELEMENTS, DecodeOptions, ParserBuilder};
pub use error::{ParserError, Result};
pub use materializer::Materializer;
pub use parser::Parser;

pub use hdm_core::{
    Complex, DecodeError, EnumMember, FlagSet, NumericArray, ParsedObject, Value,
};
pub use hdm_schema::{FormatError, Schema, TypeDescriptor};
