//! # HDM Core
//!
//! Low-level building blocks for reading HDM files.
//!
//! This crate provides:
//! - [`DecodeCursor`], a bounds-checked forward-only read position
//! - [`ReadBuffer`] for little-endian primitive reads
//! - Batched primitive decoding for the integer, float and complex formats
//! - The [`Value`] tree produced by decoding
//! - [`DecodeError`] for payload errors

pub mod buffer;
pub mod decoder;
pub mod error;
pub mod types;
pub mod value;

pub use buffer::{DecodeCursor, ReadBuffer};
pub use error::{DecodeError, Result};
pub use types::ScalarFormat;
pub use value::{Complex, EnumMember, FlagSet, NumericArray, ParsedObject, Value};
