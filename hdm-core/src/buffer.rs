//! Buffer access for payload decoding.
//!
//! This module provides:
//! - [`ReadBuffer`] trait for little-endian primitive reads at a fixed offset
//! - [`DecodeCursor`] for bounds-checked, forward-only reads over a payload

use crate::error::{DecodeError, Result};

/// Trait for read-only buffer access with little-endian primitive reads.
///
/// The `get_*` methods index directly and panic on an out-of-range offset;
/// callers are expected to have bounds-checked the region first, as
/// [`DecodeCursor::take`] does.
pub trait ReadBuffer {
    /// Returns the buffer as a byte slice.
    fn as_slice(&self) -> &[u8];

    /// Reads a u8 at the given offset.
    ///
    /// # Arguments
    /// * `offset` - Byte offset of the first byte
    #[inline(always)]
    fn get_u8(&self, offset: usize) -> u8 {
        self.as_slice()[offset]
    }

    /// Reads an i8 at the given offset.
    ///
    /// # Arguments
    /// * `offset` - Byte offset of the first byte
    #[inline(always)]
    fn get_i8(&self, offset: usize) -> i8 {
        self.as_slice()[offset] as i8
    }

    /// Reads a u16 in little-endian at the given offset.
    ///
    /// # Arguments
    /// * `offset` - Byte offset of the first byte
    #[inline(always)]
    fn get_u16_le(&self, offset: usize) -> u16 {
        let bytes = &self.as_slice()[offset..offset + 2];
        u16::from_le_bytes([bytes[0], bytes[1]])
    }

    /// Reads an i16 in little-endian at the given offset.
    ///
    /// # Arguments
    /// * `offset` - Byte offset of the first byte
    #[inline(always)]
    fn get_i16_le(&self, offset: usize) -> i16 {
        let bytes = &self.as_slice()[offset..offset + 2];
        i16::from_le_bytes([bytes[0], bytes[1]])
    }

    /// Reads a u32 in little-endian at the given offset.
    ///
    /// # Arguments
    /// * `offset` - Byte offset of the first byte
    #[inline(always)]
    fn get_u32_le(&self, offset: usize) -> u32 {
        let bytes = &self.as_slice()[offset..offset + 4];
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Reads an i32 in little-endian at the given offset.
    ///
    /// # Arguments
    /// * `offset` - Byte offset of the first byte
    #[inline(always)]
    fn get_i32_le(&self, offset: usize) -> i32 {
        let bytes = &self.as_slice()[offset..offset + 4];
        i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Reads a u64 in little-endian at the given offset.
    ///
    /// # Arguments
    /// * `offset` - Byte offset of the first byte
    #[inline(always)]
    fn get_u64_le(&self, offset: usize) -> u64 {
        let bytes = &self.as_slice()[offset..offset + 8];
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        u64::from_le_bytes(raw)
    }

    /// Reads an f32 in little-endian at the given offset.
    ///
    /// # Arguments
    /// * `offset` - Byte offset of the first byte
    #[inline(always)]
    fn get_f32_le(&self, offset: usize) -> f32 {
        f32::from_bits(self.get_u32_le(offset))
    }

    /// Reads an f64 in little-endian at the given offset.
    ///
    /// # Arguments
    /// * `offset` - Byte offset of the first byte
    #[inline(always)]
    fn get_f64_le(&self, offset: usize) -> f64 {
        f64::from_bits(self.get_u64_le(offset))
    }
}

impl ReadBuffer for [u8] {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        self
    }
}

/// Forward-only read position over a payload.
///
/// The cursor only ever advances, and only after a read has been
/// bounds-checked, so a failed read leaves [`position`](Self::position) at
/// the offset where the missing bytes would have started.
#[derive(Debug, Clone)]
pub struct DecodeCursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> DecodeCursor<'a> {
    /// Creates a cursor at offset 0.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Returns the current offset.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of unread bytes.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// Consumes exactly `len` bytes and returns them.
    ///
    /// # Arguments
    /// * `len` - Number of bytes to consume
    ///
    /// # Errors
    /// Returns [`DecodeError::BufferTooShort`] without moving the cursor if
    /// fewer than `len` bytes remain.
    #[inline]
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if len > available {
            return Err(DecodeError::BufferTooShort {
                offset: self.position,
                required: len,
                available,
            });
        }
        let start = self.position;
        self.position += len;
        Ok(&self.buffer[start..self.position])
    }
}
