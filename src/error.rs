use thiserror::Error;

/// I/O errors that can occur when reading from a byte source
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// Underlying read or seek failed
    #[error("Read error: {0}")]
    Read(String),

    /// File could not be opened
    #[error("File not found: {0}")]
    NotFound(String),
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => IoError::NotFound(err.to_string()),
            _ => IoError::Read(err.to_string()),
        }
    }
}

/// Errors raised while locating the metadata block.
///
/// These are the only errors that surface through
/// [`ParseResult::error`](crate::engine::ParseResult::error).
#[derive(Debug, Clone, Error)]
pub enum FormatError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// TIFF structure is invalid
    #[error("TIFF error: {0}")]
    Tiff(#[from] TiffError),

    /// The container carries no TIFF/EXIF block
    #[error("No metadata: {reason}")]
    NoMetadata { reason: String },
}

/// Errors that can occur when parsing TIFF structures
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Byte order bytes are neither II nor MM
    #[error("Invalid byte order: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidByteOrder(u16),

    /// Magic number after the byte order is not 42
    #[error("Invalid TIFF magic: expected 42, got {0}")]
    InvalidMagic(u16),

    /// Source is too small to contain a TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Directory offset points outside the source
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// Directory entries would run past the end of the source
    #[error("IFD at offset {offset} with {entries} entries exceeds the source")]
    DirectoryOutOfBounds { offset: u64, entries: u16 },

    /// External value block lies outside the source
    #[error("Value block out of bounds: {len} bytes at offset {offset}, size is {size}")]
    ValueOutOfBounds { offset: u64, len: u64, size: u64 },

    /// Unknown field type in IFD entry
    #[error("Unknown field type: {0}")]
    UnknownFieldType(u16),

    /// A directory chain points back to an already visited directory
    #[error("IFD chain loops back to offset {0}")]
    DirectoryCycle(u64),
}

/// Errors from the external image codec
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Input bytes could not be decoded to a raster
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Raster could not be encoded
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Errors raised while producing a thumbnail.
///
/// Never surfaced to callers of the engine; a failed thumbnail is simply absent.
#[derive(Debug, Clone, Error)]
pub enum ThumbnailError {
    /// I/O error while reading preview or strip data
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// TIFF error while reading preview or strip data
    #[error("TIFF error: {0}")]
    Tiff(#[from] TiffError),

    /// Codec rejected the bytes
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// A tag required by the selected strategy is missing or has no usable value
    #[error("Missing thumbnail tag: {0}")]
    MissingTag(&'static str),

    /// Strip offsets and byte counts cannot be paired
    #[error("Strip layout mismatch: {offsets} offsets, {counts} byte counts")]
    InvalidStripLayout { offsets: usize, counts: usize },

    /// Synthesized blob would not be addressable with 32-bit offsets
    #[error("Synthesized TIFF too large: {0} bytes")]
    BlobTooLarge(usize),
}

/// Errors from a vendor MakerNote decoder
#[derive(Debug, Clone, Error)]
pub enum VendorError {
    /// I/O error while reading vendor data
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// TIFF error while reading vendor data
    #[error("TIFF error: {0}")]
    Tiff(#[from] TiffError),

    /// Vendor record could not be interpreted
    #[error("Vendor decode error: {0}")]
    Decode(String),
}
