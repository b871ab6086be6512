//! Adobe image resource blocks.
//!
//! The Photoshop private TIFF tag holds a sequence of image resources, the
//! same structure PSD files keep in their "Image Resources" section:
//!
//! ```text
//! "8BIM"            4 bytes
//! resource ID       u16 BE
//! name              Pascal string, length byte + name padded to an even total
//! data size         u32 BE
//! data              data size bytes, plus 1 pad byte if the size is odd
//! ```

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::io::ByteCursor;

/// Signature that opens every image resource and additional layer info block.
pub const SIGNATURE_8BIM: &[u8; 4] = b"8BIM";

/// Resource carrying the layer-and-mask information in Photoshop TIFFs.
pub const LAYER_INFO_RESOURCE_ID: u16 = 1058;

// =============================================================================
// ImageResource
// =============================================================================

/// A single image resource recovered from an 8BIM block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResource {
    /// Photoshop resource type identifier
    pub id: u16,

    /// Resource name, usually empty
    pub name: String,

    /// Payload, excluding the pad byte
    pub data: Bytes,
}

impl ImageResource {
    /// Declared payload size; always equal to `data.len()`.
    #[inline]
    pub fn data_size(&self) -> u32 {
        self.data.len() as u32
    }

    /// Adobe's name for this resource type, if it is one we know.
    pub fn kind(&self) -> Option<&'static str> {
        resource_kind(self.id)
    }

    /// Manifest entry for this resource.
    pub fn summary(&self) -> ResourceSummary {
        ResourceSummary {
            id: self.id,
            name: self.name.clone(),
            size: self.data_size(),
        }
    }
}

/// `{id, name, size}` manifest entry reported alongside extracted layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
    pub id: u16,
    pub name: String,
    pub size: u32,
}

/// Adobe's documented names for the resource IDs seen in layered TIFFs.
pub fn resource_kind(id: u16) -> Option<&'static str> {
    let name = match id {
        1005 => "ResolutionInfo",
        1024 => "Layer state information",
        1026 => "Layer group information",
        1028 => "IPTC-NAA record",
        1032 => "Grid and guides",
        1034 => "Copyright flag",
        1036 => "Thumbnail",
        1039 => "ICC profile",
        1044 => "Document-specific IDs seed",
        1050 => "Slices",
        1054 => "URL list",
        1057 => "Version info",
        1058 => "Layer and mask information",
        1060 => "XMP metadata",
        1061 => "Caption digest",
        1069 => "Layer selection IDs",
        1072 => "Layer group(s) enabled ID",
        1077 => "DisplayInfo",
        1082 => "Print information",
        1083 => "Print style",
        _ => return None,
    };
    Some(name)
}

// =============================================================================
// Resource Block Walker
// =============================================================================

/// Byte length of the Pascal name field, counted from the length byte and
/// rounded up to an even total.
#[inline]
pub fn padded_name_length(name_length: u8) -> usize {
    (name_length as usize + 2) & !1
}

/// Walk an 8BIM image resource block.
///
/// Returns resources in file order. The walk stops quietly at the first
/// missing signature or truncated header/payload; everything parsed before
/// that point is returned.
pub fn walk_resources(block: &Bytes) -> Vec<ImageResource> {
    let mut cursor = ByteCursor::new(block);
    let mut resources = Vec::new();

    while cursor.remaining() > 0 {
        let start = cursor.position();
        match read_resource(&mut cursor, block) {
            Some(resource) => resources.push(resource),
            None => {
                debug!(
                    offset = start,
                    remaining = block.len() - start,
                    parsed = resources.len(),
                    "Resource walk stopped"
                );
                break;
            }
        }
    }

    resources
}

fn read_resource(cursor: &mut ByteCursor<'_>, block: &Bytes) -> Option<ImageResource> {
    let start = cursor.position();

    if &cursor.read_tag().ok()? != SIGNATURE_8BIM {
        return None;
    }
    let id = cursor.read_u16().ok()?;

    let name_length = cursor.read_u8().ok()?;
    let name = cursor
        .peek(name_length as usize)
        .map(|raw| String::from_utf8_lossy(raw).into_owned())
        .unwrap_or_default();
    // The length byte was already consumed
    cursor.skip(padded_name_length(name_length) - 1).ok()?;

    let data_size = cursor.read_u32().ok()? as usize;
    let data_start = cursor.position();
    cursor.skip(data_size).ok()?;
    let data = block.slice(data_start..data_start + data_size);

    // Word alignment; the last block may omit its pad byte
    if data_size % 2 == 1 && cursor.remaining() > 0 {
        cursor.skip(1).ok()?;
    }

    debug_assert!(cursor.position() > start);

    Some(ImageResource {
        id,
        name,
        data,
    })
}

/// First resource with the given ID.
pub fn find_resource(resources: &[ImageResource], id: u16) -> Option<&ImageResource> {
    resources.iter().find(|r| r.id == id)
}

// =============================================================================
// Tests
// =============================================================================
