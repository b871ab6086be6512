//! # tiff-layers
//!
//! Layer metadata extraction for TIFF files written by Photoshop.
//!
//! Photoshop stores its layer table inside a TIFF private tag (34377) as an
//! 8BIM image resource block. This crate finds that block, walks its
//! resources, decodes the layer-and-mask information, and returns a
//! [`TiffLayerData`] describing the document and each layer: bounds, blend
//! mode, opacity, visibility, channel table and name. Pixel data is never
//! decoded.
//!
//! ## Architecture
//!
//! - [`io`] - byte sources ([`RangeReader`]) and a big-endian cursor
//! - [`mod@format`] - the TIFF container decoder and Photoshop structures
//! - [`extract`] - the extraction pipeline and its result types
//! - [`inspect`] - structure diagnostics for malformed files
//! - [`cache`] - content-addressed LRU cache of extraction results
//! - [`config`] - CLI configuration for the `tiff-layers` binary
//!
//! ## Example
//!
//! ```rust,no_run
//! use tiff_layers::{extract_layers_from_path, ExtractOptions};
//!
//! let data = extract_layers_from_path("layered.tif", &ExtractOptions::default())?;
//! for layer in &data.layers {
//!     println!("{} {}x{} {}", layer.name, layer.width, layer.height, layer.blend_mode);
//! }
//! # Ok::<(), tiff_layers::LayerError>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod inspect;
pub mod io;

// Re-export commonly used types
pub use cache::{fingerprint, LayerCache, DEFAULT_CACHE_ENTRIES};
pub use config::{Cli, Command, InspectConfig, LayersConfig, OutputFormat};
pub use error::{IoError, LayerError, TiffError};
pub use extract::{
    extract_layers, extract_layers_from_directories, extract_layers_from_path,
    extract_layers_with, find_photoshop_block, ExtractOptions, LayerSource, TiffLayerData,
    COLOR_MODE_RGB, DEFAULT_MAX_INPUT_SIZE,
};
pub use format::psd::{
    parse_layer_info, recover_layers, walk_resources, ChannelInfo, ImageResource, LayerInfo,
    LayerRecord, ResourceSummary,
};
pub use format::tiff::{decode_directories, ByteOrder, TagValue, TiffImageDirectory, TiffTag};
pub use inspect::{analyze, inspect_bytes, inspect_path, StructureReport};
pub use io::{MemoryReader, RangeReader};
