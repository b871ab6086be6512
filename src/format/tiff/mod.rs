//! TIFF container decoding.
//!
//! This is the container collaborator of the layer extractor: it turns a byte
//! source into a list of [`TiffImageDirectory`] values and nothing more.
//! Pixel data is never touched.
//!
//! # Key Concepts
//!
//! - **Byte order**: TIFF files declare their endianness (II = little-endian,
//!   MM = big-endian) in the header. All multi-byte values must be read
//!   respecting this order.
//!
//! - **Classic TIFF vs BigTIFF**: Classic TIFF uses 32-bit offsets, BigTIFF
//!   uses 64-bit offsets. Both are handled transparently.
//!
//! - **Inline vs offset values**: Small values are stored inline in the IFD
//!   entry, larger values (such as the Photoshop resource block) are stored
//!   at an offset pointed to by the entry.

mod directory;
mod parser;
mod tags;
mod values;

pub use directory::{decode_directories, TiffImageDirectory};
pub use parser::{ByteOrder, Ifd, IfdEntry, TiffHeader, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE};
pub use tags::{FieldType, TiffTag};
pub use values::TagValue;
