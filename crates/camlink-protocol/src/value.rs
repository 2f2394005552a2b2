//! Per-field value decoding for game-event occurrences.
//!
//! Event descriptors tag each key with a numeric type. Occurrence payloads
//! then carry the values back to back, with position as the only link to
//! field identity. Whatever the native type, every decoded value is
//! normalized to its canonical string form — that is the protocol's
//! contract, not a shortcut.

use crate::{Cursor, ProtocolError};

/// The closed set of key types this decoder implements.
///
/// Wire numbering starts at 1. A raw tag outside this set is representable
/// on the wire but not in this enum; [`decode_value`] turns it into
/// [`ProtocolError::UnknownKeyType`] so exhaustive matching below stays a
/// compile-time guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// NUL-terminated bytes, passed through as-is.
    String,
    /// 4-byte little-endian IEEE-754, shortest round-trip decimal form.
    Float32,
    /// 4-byte little-endian signed, decimal.
    Int32,
    /// 2-byte little-endian signed, decimal.
    Int16,
    /// 1-byte signed, decimal.
    Int8,
    /// One byte, nonzero means `"true"`.
    Boolean,
    /// A 64-bit value split into two little-endian u32 halves, `lo` then
    /// `hi`, rendered as the decimal of `lo | (hi << 32)`.
    Uint64FromHalves,
}

impl TypeTag {
    /// Maps a raw wire tag to a known type, or `None` if out of range.
    pub fn from_wire(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(Self::String),
            2 => Some(Self::Float32),
            3 => Some(Self::Int32),
            4 => Some(Self::Int16),
            5 => Some(Self::Int8),
            6 => Some(Self::Boolean),
            7 => Some(Self::Uint64FromHalves),
            _ => None,
        }
    }
}

/// Decodes one typed value from the cursor into its canonical string form.
///
/// # Errors
/// - [`ProtocolError::UnknownKeyType`] if `raw_tag` is outside the known
///   set.
/// - [`ProtocolError::FrameTruncated`] if fewer bytes remain than the tag
///   requires.
pub fn decode_value(
    raw_tag: i32,
    cursor: &mut Cursor<'_>,
) -> Result<String, ProtocolError> {
    let tag = TypeTag::from_wire(raw_tag)
        .ok_or(ProtocolError::UnknownKeyType(raw_tag))?;

    Ok(match tag {
        TypeTag::String => cursor.read_cstr()?,
        TypeTag::Float32 => cursor.read_f32_le()?.to_string(),
        TypeTag::Int32 => cursor.read_i32_le()?.to_string(),
        TypeTag::Int16 => cursor.read_i16_le()?.to_string(),
        TypeTag::Int8 => cursor.read_i8()?.to_string(),
        TypeTag::Boolean => match cursor.read_u8()? {
            0 => "false".to_string(),
            _ => "true".to_string(),
        },
        TypeTag::Uint64FromHalves => {
            let lo = cursor.read_u32_le()?;
            let hi = cursor.read_u32_le()?;
            (u64::from(lo) | (u64::from(hi) << 32)).to_string()
        }
    })
}

// =========================================================================
// Tests
// =========================================================================
