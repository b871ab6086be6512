//! Layer-and-mask information parsing.
//!
//! # Layout
//!
//! ```text
//! total length          u32 BE (informational)
//! layer info length     u32 BE (0 = no layers)
//! layer count           i16 BE (negative: first alpha channel is merged transparency)
//! per layer:
//!     top, left, bottom, right     4 x i32 BE
//!     channel count                u16 BE
//!     per channel: id i16 BE, data length u32 BE
//!     blend signature "8BIM", blend mode (4 ASCII bytes)
//!     opacity u8, clipping u8, flags u8, filler u8
//!     extra data length            u32 BE
//!     extra data                   additional layer information trailer
//! ```
//!
//! The trailer is searched for a layer name in its `8BIM` sub-blocks (`8BIM`
//! + key + u32 length + payload, even-padded), starting at the first byte.
//! A trailer that does not open with `8BIM` carries no name. `luni` wins
//! over `lnam`; a layer with neither is called `"Layer {n}"`.
//!
//! Running out of bytes inside a record ends the record loop: records
//! completed so far are kept and [`LayerInfo::is_truncated`] reports the
//! shortfall.

use serde::Serialize;
use tracing::debug;

use crate::error::{IoError, LayerError};
use crate::format::tiff::ByteOrder;
use crate::io::ByteCursor;

use super::resources::SIGNATURE_8BIM;

/// Byte order of `luni` code units as written by Photoshop's TIFF writer.
pub const LUNI_BYTE_ORDER: ByteOrder = ByteOrder::LittleEndian;

/// Flag bit that marks a layer as hidden.
pub const FLAG_HIDDEN: u8 = 0x02;

/// Blend mode code for normal compositing.
pub const BLEND_NORMAL: &str = "norm";

const KEY_UNICODE_NAME: &[u8; 4] = b"luni";
const KEY_ASCII_NAME: &[u8; 4] = b"lnam";

/// Size of an additional layer information header: signature, key, length.
const SUB_BLOCK_HEADER_SIZE: usize = 12;

/// Minimum size of a layer-and-mask info buffer: the two length fields.
const HEADER_SIZE: usize = 8;

// =============================================================================
// Types
// =============================================================================

/// One entry of a layer's channel table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelInfo {
    /// Channel ID: 0.. for color, -1 transparency mask, -2 user mask
    pub id: i16,

    /// Length of the channel's image data in the file
    pub length: u32,
}

/// A single layer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRecord {
    pub name: String,
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
    pub width: u32,
    pub height: u32,
    pub blend_mode: String,
    pub opacity: u8,
    pub clipping: bool,
    pub flags: u8,
    pub visible: bool,
    pub channel_count: u16,
    pub channels: Vec<ChannelInfo>,
}

/// Whether a layer with these flags is shown.
#[inline]
pub const fn visible_from_flags(flags: u8) -> bool {
    flags & FLAG_HIDDEN == 0
}

/// Default name for the layer at zero-based `index`.
pub fn default_layer_name(index: usize) -> String {
    format!("Layer {}", index + 1)
}

/// Span between two edges, clamped to zero for inverted bounds.
fn span(from: i32, to: i32) -> u32 {
    (to as i64 - from as i64).clamp(0, u32::MAX as i64) as u32
}

/// Parsed layer-and-mask information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerInfo {
    /// Declared total section length (not used for bounds checking)
    pub total_length: u32,

    /// Declared layer info length
    pub layer_info_length: u32,

    /// Raw signed layer count
    pub layer_count: i16,

    /// Records in file order
    pub records: Vec<LayerRecord>,
}

impl LayerInfo {
    fn empty(total_length: u32, layer_info_length: u32) -> Self {
        Self {
            total_length,
            layer_info_length,
            layer_count: 0,
            records: Vec::new(),
        }
    }

    /// Number of layers the header declares.
    pub fn declared_layers(&self) -> usize {
        self.layer_count.unsigned_abs() as usize
    }

    /// A negative layer count means the first alpha channel holds the
    /// transparency of the merged image.
    pub fn merged_alpha_present(&self) -> bool {
        self.layer_count < 0
    }

    /// Fewer records were recovered than the header declares.
    pub fn is_truncated(&self) -> bool {
        self.records.len() < self.declared_layers()
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a layer-and-mask information buffer.
///
/// Fails only when the fixed header cannot be read. A record that runs past
/// the end of the buffer ends the loop; earlier records are returned.
pub fn parse_layer_info(data: &[u8]) -> Result<LayerInfo, LayerError> {
    if data.len() < HEADER_SIZE {
        return Err(LayerError::BufferTooSmall {
            required: HEADER_SIZE,
            actual: data.len(),
        });
    }

    let mut cursor = ByteCursor::new(data);
    let total_length = cursor.read_u32()?;
    let layer_info_length = cursor.read_u32()?;

    if layer_info_length == 0 {
        return Ok(LayerInfo::empty(total_length, layer_info_length));
    }

    let layer_count = cursor
        .read_i16()
        .map_err(|_| LayerError::BufferTooSmall {
            required: HEADER_SIZE + 2,
            actual: data.len(),
        })?;

    let declared = layer_count.unsigned_abs() as usize;
    let mut records = Vec::with_capacity(declared.min(data.len() / 32));

    for index in 0..declared {
        match read_layer_record(data, &mut cursor, index) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!(
                    index,
                    declared,
                    parsed = records.len(),
                    error = %e,
                    "Layer records truncated"
                );
                break;
            }
        }
    }

    debug!(
        total_length,
        layer_info_length, layer_count,
        parsed = records.len(),
        "Parsed layer info"
    );

    Ok(LayerInfo {
        total_length,
        layer_info_length,
        layer_count,
        records,
    })
}

fn read_layer_record(
    data: &[u8],
    cursor: &mut ByteCursor<'_>,
    index: usize,
) -> Result<LayerRecord, IoError> {
    let top = cursor.read_i32()?;
    let left = cursor.read_i32()?;
    let bottom = cursor.read_i32()?;
    let right = cursor.read_i32()?;

    let channel_count = cursor.read_u16()?;
    let mut channels = Vec::with_capacity((channel_count as usize).min(cursor.remaining() / 6));
    for _ in 0..channel_count {
        let id = cursor.read_i16()?;
        let length = cursor.read_u32()?;
        channels.push(ChannelInfo { id, length });
    }

    // Blend signature is not validated
    cursor.skip(4)?;
    let blend_mode = String::from_utf8_lossy(&cursor.read_tag()?).into_owned();
    let opacity = cursor.read_u8()?;
    let clipping = cursor.read_u8()?;
    let flags = cursor.read_u8()?;
    cursor.skip(1)?;

    let extra_length = cursor.read_u32()? as usize;
    let extra_start = cursor.position();
    let extra_end = extra_start.saturating_add(extra_length);
    // A trailer reaching past the buffer makes the whole record incomplete
    let trailer = data
        .get(extra_start..extra_end)
        .ok_or(IoError::RangeOutOfBounds {
            offset: extra_start as u64,
            requested: extra_length as u64,
            size: data.len() as u64,
        })?;

    let name = scan_sub_blocks(trailer).unwrap_or_else(|| default_layer_name(index));

    // Always resume at the declared trailer end
    cursor.seek(extra_end);

    Ok(LayerRecord {
        name,
        top,
        left,
        bottom,
        right,
        width: span(left, right),
        height: span(top, bottom),
        blend_mode,
        opacity,
        clipping: clipping != 0,
        flags,
        visible: visible_from_flags(flags),
        channel_count,
        channels,
    })
}

/// Scan `8BIM` sub-blocks for `luni` or `lnam`.
///
/// Stops at the first block without the signature, and after the first name
/// block whether or not its payload decodes.
fn scan_sub_blocks(area: &[u8]) -> Option<String> {
    let mut cursor = ByteCursor::new(area);

    while cursor.remaining() >= SUB_BLOCK_HEADER_SIZE {
        if &cursor.read_tag().ok()? != SIGNATURE_8BIM {
            return None;
        }
        let key = cursor.read_tag().ok()?;
        let length = cursor.read_u32().ok()? as usize;

        match &key {
            KEY_UNICODE_NAME => return decode_unicode_name(&mut cursor),
            KEY_ASCII_NAME => return decode_pascal_name(&mut cursor),
            _ => {
                let padded = length.saturating_add(length & 1);
                cursor.seek(cursor.position().saturating_add(padded));
            }
        }
    }

    None
}

/// `luni` payload: u32 BE character count, then UTF-16 code units.
fn decode_unicode_name(cursor: &mut ByteCursor<'_>) -> Option<String> {
    let count = cursor.read_u32().ok()? as usize;
    let raw = cursor.take(count.checked_mul(2)?).ok()?;

    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|unit| LUNI_BYTE_ORDER.read_u16(unit))
        .collect();
    let name = String::from_utf16_lossy(&units);
    let name = name.trim_end_matches('\0');

    (!name.is_empty()).then(|| name.to_string())
}

/// `lnam` payload: Pascal string.
fn decode_pascal_name(cursor: &mut ByteCursor<'_>) -> Option<String> {
    let length = cursor.read_u8().ok()? as usize;
    let raw = cursor.take(length).ok()?;
    let name = String::from_utf8_lossy(raw).into_owned();

    (!name.is_empty()).then_some(name)
}

// =============================================================================
// Tests
// =============================================================================
