//! Scalar wire formats.
//!
//! Every primitive in an HDM payload is one of a small, closed set of
//! little-endian encodings. Integer widths are limited to 1, 2 and 4 bytes;
//! floats are IEEE754 single or double; complex values are two consecutive
//! floats of the same width.

/// Little-endian scalar encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarFormat {
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 8-bit integer.
    Uint8,
    /// Unsigned 16-bit integer.
    Uint16,
    /// Unsigned 32-bit integer.
    Uint32,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// Pair of 32-bit floats (re, im).
    Complex64,
    /// Pair of 64-bit floats (re, im).
    Complex128,
}

impl ScalarFormat {
    /// Selects an integer format by byte width.
    ///
    /// Returns `None` for any width other than 1, 2 or 4.
    #[must_use]
    pub const fn int(width: usize, signed: bool) -> Option<Self> {
        match (width, signed) {
            (1, true) => Some(Self::Int8),
            (2, true) => Some(Self::Int16),
            (4, true) => Some(Self::Int32),
            (1, false) => Some(Self::Uint8),
            (2, false) => Some(Self::Uint16),
            (4, false) => Some(Self::Uint32),
            _ => None,
        }
    }

    /// Selects a float format by byte width (4 or 8).
    #[must_use]
    pub const fn float(width: usize) -> Option<Self> {
        match width {
            4 => Some(Self::Float32),
            8 => Some(Self::Float64),
            _ => None,
        }
    }

    /// Selects a complex format by the byte width of one component (4 or 8).
    #[must_use]
    pub const fn complex(component_width: usize) -> Option<Self> {
        match component_width {
            4 => Some(Self::Complex64),
            8 => Some(Self::Complex128),
            _ => None,
        }
    }

    /// Returns the encoded size of one element in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Float64 | Self::Complex64 => 8,
            Self::Complex128 => 16,
        }
    }

    /// Returns true for the integer formats.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Uint8 | Self::Uint16 | Self::Uint32
        )
    }

    /// Returns true for the complex formats.
    #[must_use]
    pub const fn is_complex(&self) -> bool {
        matches!(self, Self::Complex64 | Self::Complex128)
    }

    /// Returns the bit width of an integer format, or 0 for non-integers.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        if self.is_integer() {
            (self.size() * 8) as u32
        } else {
            0
        }
    }

    /// Returns a short name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_widths() {
        assert_eq!(ScalarFormat::int(1, true), Some(ScalarFormat::Int8));
        assert_eq!(ScalarFormat::int(2, false), Some(ScalarFormat::Uint16));
        assert_eq!(ScalarFormat::int(4, true), Some(ScalarFormat::Int32));
        assert_eq!(ScalarFormat::int(3, true), None);
        assert_eq!(ScalarFormat::int(8, false), None);
    }

    #[test]
    fn test_float_and_complex_widths() {
        assert_eq!(ScalarFormat::float(4), Some(ScalarFormat::Float32));
        assert_eq!(ScalarFormat::float(8), Some(ScalarFormat::Float64));
        assert_eq!(ScalarFormat::float(2), None);
        assert_eq!(ScalarFormat::complex(8), Some(ScalarFormat::Complex128));
        assert_eq!(ScalarFormat::complex(16), None);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(ScalarFormat::Uint8.size(), 1);
        assert_eq!(ScalarFormat::Int16.size(), 2);
        assert_eq!(ScalarFormat::Float32.size(), 4);
        assert_eq!(ScalarFormat::Complex64.size(), 8);
        assert_eq!(ScalarFormat::Complex128.size(), 16);
    }

    #[test]
    fn test_bits() {
        assert_eq!(ScalarFormat::Uint8.bits(), 8);
        assert_eq!(ScalarFormat::Int32.bits(), 32);
        assert_eq!(ScalarFormat::Float64.bits(), 0);
    }
}
