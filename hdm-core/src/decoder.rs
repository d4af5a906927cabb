//! Batched primitive decoding.
//!
//! A primitive read consumes exactly `format.size() * count` bytes from the
//! cursor in one bounds-checked step and unpacks them as little-endian
//! values.

use crate::buffer::{DecodeCursor, ReadBuffer};
use crate::error::{DecodeError, Result};
use crate::types::ScalarFormat;
use crate::value::{Complex, NumericArray};

impl DecodeCursor<'_> {
    /// Reads `count` consecutive elements of `format`.
    ///
    /// # Arguments
    /// * `format` - Scalar format of each element
    /// * `count` - Number of elements to read
    ///
    /// # Errors
    /// Returns [`DecodeError::BufferTooShort`] if the whole run does not fit
    /// in the remaining payload. Nothing is consumed in that case.
    pub fn read_array(&mut self, format: ScalarFormat, count: usize) -> Result<NumericArray> {
        let bytes = self.take_run(format, count)?;
        Ok(unpack(bytes, format))
    }

    /// Reads one integer of an integer format, widened to i64.
    ///
    /// # Arguments
    /// * `format` - One of the integer formats
    ///
    /// # Errors
    /// Returns [`DecodeError::BufferTooShort`] if the value does not fit, or
    /// [`DecodeError::UnexpectedType`] if `format` is not an integer format.
    pub fn read_int(&mut self, format: ScalarFormat) -> Result<i64> {
        require_integer(format)?;
        let bytes = self.take(format.size())?;
        Ok(int_at(bytes, 0, format))
    }

    /// Reads `count` integers of an integer format in one batch.
    ///
    /// # Arguments
    /// * `format` - One of the integer formats
    /// * `count` - Number of integers to read
    ///
    /// # Errors
    /// Same as [`read_int`](Self::read_int), for the whole run.
    pub fn read_ints(&mut self, format: ScalarFormat, count: usize) -> Result<Vec<i64>> {
        require_integer(format)?;
        let bytes = self.take_run(format, count)?;
        let width = format.size();
        Ok((0..count).map(|i| int_at(bytes, i * width, format)).collect())
    }

    /// Takes the bytes of `count` consecutive elements of `format`.
    fn take_run(&mut self, format: ScalarFormat, count: usize) -> Result<&[u8]> {
        let total = format
            .size()
            .checked_mul(count)
            .ok_or_else(|| DecodeError::BufferTooShort {
                offset: self.position(),
                required: usize::MAX,
                available: self.remaining(),
            })?;
        self.take(total)
    }
}

fn require_integer(format: ScalarFormat) -> Result<()> {
    if format.is_integer() {
        Ok(())
    } else {
        Err(DecodeError::UnexpectedType {
            name: format.name().to_string(),
            expected: "an integer format",
        })
    }
}

fn unpack(bytes: &[u8], format: ScalarFormat) -> NumericArray {
    let width = format.size();
    let offsets = (0..bytes.len()).step_by(width.max(1));
    match format {
        ScalarFormat::Float32 => {
            NumericArray::Float(offsets.map(|o| f64::from(bytes.get_f32_le(o))).collect())
        }
        ScalarFormat::Float64 => NumericArray::Float(offsets.map(|o| bytes.get_f64_le(o)).collect()),
        ScalarFormat::Complex64 => NumericArray::Complex(
            offsets
                .map(|o| {
                    Complex::new(
                        f64::from(bytes.get_f32_le(o)),
                        f64::from(bytes.get_f32_le(o + 4)),
                    )
                })
                .collect(),
        ),
        ScalarFormat::Complex128 => NumericArray::Complex(
            offsets
                .map(|o| Complex::new(bytes.get_f64_le(o), bytes.get_f64_le(o + 8)))
                .collect(),
        ),
        _ => NumericArray::Int(offsets.map(|o| int_at(bytes, o, format)).collect()),
    }
}

#[inline]
fn int_at(bytes: &[u8], offset: usize, format: ScalarFormat) -> i64 {
    match format {
        ScalarFormat::Int8 => i64::from(bytes.get_i8(offset)),
        ScalarFormat::Int16 => i64::from(bytes.get_i16_le(offset)),
        ScalarFormat::Int32 => i64::from(bytes.get_i32_le(offset)),
        ScalarFormat::Uint8 => i64::from(bytes.get_u8(offset)),
        ScalarFormat::Uint16 => i64::from(bytes.get_u16_le(offset)),
        ScalarFormat::Uint32 => i64::from(bytes.get_u32_le(offset)),
        // Callers only pass integer formats.
        _ => 0,
    }
}
