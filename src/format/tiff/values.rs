//! Typed TIFF tag values.
//!
//! Every decoded tag lands in one of three shapes. Accessors are fallible so
//! callers decide what a shape mismatch means for them.

use bytes::Bytes;

use super::parser::{ByteOrder, IfdEntry};
use super::tags::FieldType;

/// A decoded tag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// A single unsigned integer (SHORT, LONG, LONG8 or IFD with count 1)
    Scalar(u32),

    /// Several unsigned integers, in file order
    Sequence(Vec<u32>),

    /// Raw bytes (BYTE, ASCII, UNDEFINED and every non-integer type)
    Bytes(Bytes),
}

impl TagValue {
    /// Decode the raw bytes of `entry` into a value.
    ///
    /// `data` must hold exactly the entry's value bytes. Returns `None` for
    /// entries with an unknown field type. 64-bit integers that do not fit
    /// in a `u32` are saturated.
    pub fn decode(entry: &IfdEntry, data: Bytes, byte_order: ByteOrder) -> Option<Self> {
        let field_type = entry.field_type?;

        if !field_type.is_unsigned_integer() {
            return Some(TagValue::Bytes(data));
        }

        let size = field_type.size_in_bytes();
        let values: Vec<u32> = data
            .chunks_exact(size)
            .map(|chunk| match field_type {
                FieldType::Short => byte_order.read_u16(chunk) as u32,
                FieldType::Long | FieldType::Ifd => byte_order.read_u32(chunk),
                _ => u32::try_from(byte_order.read_u64(chunk)).unwrap_or(u32::MAX),
            })
            .collect();

        match values.as_slice() {
            [single] => Some(TagValue::Scalar(*single)),
            _ => Some(TagValue::Sequence(values)),
        }
    }

    /// The value as a single number. A sequence yields its first element.
    pub fn as_scalar(&self) -> Option<u32> {
        match self {
            TagValue::Scalar(v) => Some(*v),
            TagValue::Sequence(values) => values.first().copied(),
            TagValue::Bytes(_) => None,
        }
    }

    /// The value as a list of numbers. A scalar yields a one-element list.
    pub fn as_sequence(&self) -> Option<Vec<u32>> {
        match self {
            TagValue::Scalar(v) => Some(vec![*v]),
            TagValue::Sequence(values) => Some(values.clone()),
            TagValue::Bytes(_) => None,
        }
    }

    /// The raw byte payload.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            TagValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The payload as text, truncated at the first NUL.
    pub fn as_text(&self) -> Option<String> {
        let bytes = self.as_bytes()?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Size of the payload in bytes (numbers count as 4 bytes each).
    pub fn byte_len(&self) -> usize {
        match self {
            TagValue::Scalar(_) => 4,
            TagValue::Sequence(values) => values.len() * 4,
            TagValue::Bytes(bytes) => bytes.len(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
