//! Layer extraction pipeline.
//!
//! ```text
//! TIFF bytes -> directories -> tag 34377 -> 8BIM resources
//!            -> resource 1058 (or fallback) -> layer records -> TiffLayerData
//! ```
//!
//! Every entry point is a pure function of its input: the same bytes always
//! produce the same [`TiffLayerData`], so callers may cache results by
//! content (see [`LayerCache`](crate::cache::LayerCache)).

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, warn, Level};

use crate::error::{IoError, LayerError, TiffError};
use crate::format::psd::{
    find_resource, parse_layer_info, recover_layers, walk_resources, LayerInfo, LayerRecord,
    ResourceSummary, BLEND_NORMAL, LAYER_INFO_RESOURCE_ID,
};
use crate::format::tiff::{decode_directories, TagValue, TiffImageDirectory, TiffTag};
use crate::inspect;
use crate::io::MemoryReader;

// =============================================================================
// Constants
// =============================================================================

/// Default upper bound on input size (512 MiB).
pub const DEFAULT_MAX_INPUT_SIZE: u64 = 512 * 1024 * 1024;

/// Color mode reported for every file on this path.
pub const COLOR_MODE_RGB: &str = "RGB";

const DEFAULT_CHANNELS: u32 = 3;
const DEFAULT_BITS_PER_CHANNEL: u32 = 8;

// =============================================================================
// Options
// =============================================================================

/// Limits applied before any parsing starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Inputs larger than this are rejected with [`LayerError::InputTooLarge`]
    pub max_input_size: u64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
        }
    }
}

impl ExtractOptions {
    pub(crate) fn check_size(&self, size: u64) -> Result<(), LayerError> {
        if size > self.max_input_size {
            return Err(LayerError::InputTooLarge {
                size,
                limit: self.max_input_size,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// Where the layer records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayerSource {
    /// Resource 1058
    Canonical,

    /// A fallback resource, parsed `skip` bytes into its payload
    Fallback {
        #[serde(rename = "resourceId")]
        resource_id: u16,
        skip: usize,
    },

    /// Neither the canonical nor any fallback resource held layers
    NotFound,
}

/// Layer metadata extracted from a Photoshop TIFF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiffLayerData {
    /// Width of the first directory
    pub width: u32,

    /// Height of the first directory
    pub height: u32,

    /// SamplesPerPixel of the first directory
    pub channels: u32,

    /// First BitsPerSample value of the first directory
    pub bits_per_channel: u32,

    /// Always [`COLOR_MODE_RGB`]
    pub color_mode: String,

    /// Layer records in file order
    pub layers: Vec<LayerRecord>,

    /// Any layer uses a blend mode other than `norm`
    pub has_transparency: bool,

    pub total_layers: usize,

    /// Every resource found in the block, in file order
    pub resources: Vec<ResourceSummary>,

    pub source: LayerSource,

    /// The raw layer count was negative
    pub merged_alpha_present: bool,

    /// Software tag of the first directory
    pub software: Option<String>,
}

// =============================================================================
// Photoshop-Tag Extractor
// =============================================================================

/// Raw bytes of the Photoshop private tag in the first directory.
///
/// Returns [`TiffError::MissingTag`] when there are no directories or the
/// first one lacks the tag.
pub fn find_photoshop_block(directories: &[TiffImageDirectory]) -> Result<&Bytes, TiffError> {
    let first = directories
        .first()
        .ok_or(TiffError::MissingTag(TiffTag::Photoshop.name()))?;

    match first.tag(TiffTag::Photoshop) {
        Some(TagValue::Bytes(bytes)) => Ok(bytes),
        Some(other) => Err(TiffError::InvalidTagValue {
            tag: TiffTag::Photoshop.name(),
            message: format!("expected a byte payload, got {:?}", other),
        }),
        None => Err(TiffError::MissingTag(TiffTag::Photoshop.name())),
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Extract layers from an in-memory TIFF with default options.
pub fn extract_layers(data: impl Into<Bytes>) -> Result<TiffLayerData, LayerError> {
    extract_layers_with(data, &ExtractOptions::default())
}

/// Extract layers from an in-memory TIFF.
pub fn extract_layers_with(
    data: impl Into<Bytes>,
    options: &ExtractOptions,
) -> Result<TiffLayerData, LayerError> {
    let data = data.into();
    options.check_size(data.len() as u64)?;

    let reader = MemoryReader::new(data, "memory");
    let directories = decode_directories(&reader)?;
    extract_layers_from_directories(&directories)
}

/// Read a TIFF file and extract its layers.
pub fn extract_layers_from_path(
    path: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<TiffLayerData, LayerError> {
    let data = read_file(path.as_ref(), options)?;
    extract_layers_with(data, options)
}

/// Read a file, enforcing the size limit before loading it.
pub fn read_file(path: &Path, options: &ExtractOptions) -> Result<Bytes, LayerError> {
    let read_error = |e: std::io::Error| IoError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let metadata = std::fs::metadata(path).map_err(read_error)?;
    options.check_size(metadata.len())?;

    let data = std::fs::read(path).map_err(read_error)?;
    Ok(Bytes::from(data))
}

/// Extract layers from already decoded directories.
pub fn extract_layers_from_directories(
    directories: &[TiffImageDirectory],
) -> Result<TiffLayerData, LayerError> {
    let block = find_photoshop_block(directories).map_err(|e| match e {
        TiffError::MissingTag(_) => LayerError::NoPhotoshopData,
        other => LayerError::Tiff(other),
    })?;

    let resources = walk_resources(block);
    debug!(
        block_size = block.len(),
        resources = resources.len(),
        "Walked Photoshop resource block"
    );

    if tracing::enabled!(Level::DEBUG) {
        inspect::log_report(&inspect::analyze(directories, &resources));
    }

    let (info, source) = match find_resource(&resources, LAYER_INFO_RESOURCE_ID) {
        Some(resource) => {
            let info = parse_layer_info(&resource.data)?;
            if info.is_truncated() {
                warn!(
                    declared = info.declared_layers(),
                    parsed = info.records.len(),
                    "Layer records truncated, keeping complete records"
                );
            }
            (Some(info), LayerSource::Canonical)
        }
        None => {
            debug!("Layer info resource missing, trying fallbacks");
            match recover_layers(&resources).selected {
                Some((strategy, info)) => (
                    Some(info),
                    LayerSource::Fallback {
                        resource_id: strategy.resource_id,
                        skip: strategy.skip,
                    },
                ),
                None => (None, LayerSource::NotFound),
            }
        }
    };

    let summaries = resources.iter().map(|r| r.summary()).collect();
    Ok(assemble(&directories[0], info, source, summaries))
}

fn assemble(
    directory: &TiffImageDirectory,
    info: Option<LayerInfo>,
    source: LayerSource,
    resources: Vec<ResourceSummary>,
) -> TiffLayerData {
    let merged_alpha_present = info.as_ref().is_some_and(LayerInfo::merged_alpha_present);
    let layers = info.map(|i| i.records).unwrap_or_default();
    let has_transparency = layers.iter().any(|l| l.blend_mode != BLEND_NORMAL);

    TiffLayerData {
        width: directory.width,
        height: directory.height,
        channels: directory
            .scalar(TiffTag::SamplesPerPixel)
            .unwrap_or(DEFAULT_CHANNELS),
        bits_per_channel: directory
            .scalar(TiffTag::BitsPerSample)
            .unwrap_or(DEFAULT_BITS_PER_CHANNEL),
        color_mode: COLOR_MODE_RGB.to_string(),
        total_layers: layers.len(),
        layers,
        has_transparency,
        resources,
        source,
        merged_alpha_present,
        software: directory.text(TiffTag::Software),
    }
}

// =============================================================================
// Tests
// =============================================================================
