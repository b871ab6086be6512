use thiserror::Error;

/// I/O errors that can occur when reading input bytes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IoError {
    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// The input file could not be read
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },
}

/// Errors that can occur when decoding the TIFF container
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42 (TIFF) or 43 (BigTIFF), got {0}")]
    InvalidVersion(u16),

    /// Invalid BigTIFF offset byte size (must be 8)
    #[error("Invalid BigTIFF offset byte size: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file or to invalid location)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// Required tag is missing from IFD
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// Tag has unexpected type or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },
}

/// Errors returned by the layer extraction entry points
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    /// The first directory carries no Photoshop private tag (34377)
    #[error("No Photoshop layer metadata: tag 34377 not present in the first directory")]
    NoPhotoshopData,

    /// A structural section is too short to hold its fixed-size fields
    #[error("Buffer too small: need at least {required} bytes, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },

    /// Input exceeds the configured size limit
    #[error("Input too large: {size} bytes exceeds limit of {limit} bytes")]
    InputTooLarge { size: u64, limit: u64 },

    /// TIFF container error
    #[error("TIFF error: {0}")]
    Tiff(#[from] TiffError),

    /// I/O error while loading input
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}
