//! Binary format parsers.
//!
//! - [`tiff`]: the TIFF container, decoded into per-IFD tag maps
//! - [`psd`]: the Photoshop resource block and layer records stored in
//!   TIFF tag 34377

pub mod psd;
pub mod tiff;
