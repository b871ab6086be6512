//! Decoded image file directories.
//!
//! [`decode_directories`] walks the IFD chain of a TIFF file and turns each
//! table into a [`TiffImageDirectory`]: image dimensions plus a map from tag
//! ID to [`TagValue`]. Nothing here knows about Photoshop; the layer
//! extractor only consumes the resulting tag maps.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::error::TiffError;
use crate::io::RangeReader;

use super::parser::{Ifd, IfdEntry, TiffHeader, BIGTIFF_HEADER_SIZE};
use super::tags::TiffTag;
use super::values::TagValue;

/// Maximum number of IFDs to decode (safety limit)
const MAX_IFDS: usize = 64;

// =============================================================================
// TiffImageDirectory
// =============================================================================

/// One decoded IFD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TiffImageDirectory {
    /// ImageWidth, or 0 if absent
    pub width: u32,

    /// ImageLength, or 0 if absent
    pub height: u32,

    /// Every decodable tag, keyed by tag ID
    pub tags: BTreeMap<u16, TagValue>,
}

impl TiffImageDirectory {
    /// Build a directory from a tag map, deriving width and height.
    pub fn from_tags(tags: BTreeMap<u16, TagValue>) -> Self {
        let dimension = |tag: TiffTag| {
            tags.get(&tag.as_u16())
                .and_then(TagValue::as_scalar)
                .unwrap_or(0)
        };

        Self {
            width: dimension(TiffTag::ImageWidth),
            height: dimension(TiffTag::ImageLength),
            tags,
        }
    }

    pub fn tag(&self, tag: TiffTag) -> Option<&TagValue> {
        self.tags.get(&tag.as_u16())
    }

    pub fn has_tag(&self, tag: TiffTag) -> bool {
        self.tags.contains_key(&tag.as_u16())
    }

    pub fn scalar(&self, tag: TiffTag) -> Option<u32> {
        self.tag(tag).and_then(TagValue::as_scalar)
    }

    pub fn sequence(&self, tag: TiffTag) -> Option<Vec<u32>> {
        self.tag(tag).and_then(TagValue::as_sequence)
    }

    pub fn bytes(&self, tag: TiffTag) -> Option<&bytes::Bytes> {
        self.tag(tag).and_then(TagValue::as_bytes)
    }

    pub fn text(&self, tag: TiffTag) -> Option<String> {
        self.tag(tag).and_then(TagValue::as_text)
    }

    /// Tag IDs present in this directory, ascending.
    pub fn tag_ids(&self) -> Vec<u16> {
        self.tags.keys().copied().collect()
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode every IFD in the file, in chain order.
///
/// Header and IFD table errors are fatal. Individual entries whose value
/// cannot be read (unknown type, data outside the file) are skipped with a
/// warning so one bad tag does not hide the rest of the directory.
pub fn decode_directories<R: RangeReader>(
    reader: &R,
) -> Result<Vec<TiffImageDirectory>, TiffError> {
    let header_len = BIGTIFF_HEADER_SIZE.min(reader.size() as usize);
    let header_bytes = reader.read_exact_at(0, header_len)?;
    let header = TiffHeader::parse(&header_bytes, reader.size())?;

    let mut directories = Vec::new();
    let mut visited = HashSet::new();
    let mut offset = header.first_ifd_offset;

    while offset != 0 && directories.len() < MAX_IFDS {
        if !visited.insert(offset) {
            warn!(
                source = reader.identifier(),
                offset, "IFD chain loops back on itself, stopping"
            );
            break;
        }

        let ifd = read_ifd(reader, &header, offset)?;
        let next_offset = ifd.next_ifd_offset;
        directories.push(decode_ifd(reader, &header, &ifd));

        offset = next_offset;
    }

    debug!(
        source = reader.identifier(),
        count = directories.len(),
        bigtiff = header.is_bigtiff,
        "Decoded TIFF directories"
    );

    Ok(directories)
}

/// Read and parse the IFD table at `offset`.
fn read_ifd<R: RangeReader>(
    reader: &R,
    header: &TiffHeader,
    offset: u64,
) -> Result<Ifd, TiffError> {
    if offset >= reader.size() {
        return Err(TiffError::InvalidIfdOffset(offset));
    }

    let count_bytes = reader.read_exact_at(offset, header.ifd_count_size())?;
    let entry_count = if header.is_bigtiff {
        header.byte_order.read_u64(&count_bytes)
    } else {
        header.byte_order.read_u16(&count_bytes) as u64
    };

    // Bound the table by the bytes that follow it before reading anything
    let available = reader.size() - offset;
    let ifd_size = Ifd::calculate_size(entry_count, header).unwrap_or(usize::MAX);
    if ifd_size as u64 > available {
        return Err(TiffError::FileTooSmall {
            required: offset.saturating_add(ifd_size as u64),
            actual: reader.size(),
        });
    }
    let ifd_bytes = reader.read_exact_at(offset, ifd_size)?;
    Ifd::parse(&ifd_bytes, header)
}

/// Resolve every entry of `ifd` into a tag map.
fn decode_ifd<R: RangeReader>(reader: &R, header: &TiffHeader, ifd: &Ifd) -> TiffImageDirectory {
    let mut tags = BTreeMap::new();

    for entry in &ifd.entries {
        match read_entry_value(reader, header, entry) {
            Some(value) => {
                tags.insert(entry.tag, value);
            }
            None => warn!(
                source = reader.identifier(),
                tag = entry.tag,
                field_type = entry.field_type_raw,
                count = entry.count,
                "Skipping unreadable IFD entry"
            ),
        }
    }

    TiffImageDirectory::from_tags(tags)
}

fn read_entry_value<R: RangeReader>(
    reader: &R,
    header: &TiffHeader,
    entry: &IfdEntry,
) -> Option<TagValue> {
    let size = usize::try_from(entry.value_byte_size()?).ok()?;

    let data = if entry.is_inline {
        bytes::Bytes::copy_from_slice(&entry.value_offset_bytes[..size])
    } else {
        let offset = entry.value_offset(header.byte_order);
        reader.read_exact_at(offset, size).ok()?
    };

    TagValue::decode(entry, data, header.byte_order)
}

// =============================================================================
// Tests
// =============================================================================
