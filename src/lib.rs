//! # exif-engine
//!
//! An EXIF/TIFF metadata engine with thumbnail reconstruction.
//!
//! Given a JPEG or TIFF byte source, the engine locates the TIFF metadata
//! block, walks its directory graph, decodes every known tag into a typed
//! value and a display string, hands vendor MakerNotes to a make-specific
//! decoder, and rebuilds an upright thumbnail.
//!
//! ## Features
//!
//! - **Bounded parsing**: every directory, value block and strip is checked
//!   against the source length before it is read; chains are capped and
//!   cycles detected
//! - **Declarative rendering**: tag names and renderers are tables scoped by
//!   directory kind
//! - **Vendor MakerNotes**: decoders registered by camera make (Canon built in)
//! - **Thumbnails**: embedded JPEG previews, uncompressed strips rebuilt as a
//!   standalone TIFF, or a scaled-down full image
//!
//! ## Architecture
//!
//! - [`io`] - Byte sources with bounds-checked positional reads
//! - [`mod@format`] - Container location and the TIFF directory walker
//! - [`render`] - Display strings for tag values
//! - [`vendor`] - MakerNote decoders
//! - [`thumbnail`] - Thumbnail strategies and TIFF synthesis
//! - [`codec`] - Image codec seam
//! - [`engine`] - The [`Engine`] façade
//! - [`config`] - Engine options and CLI configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use exif_engine::{Engine, ReaderSource};
//!
//! let engine = Engine::new();
//! let source = ReaderSource::open("photo.jpg").expect("open");
//! let result = engine.parse(source, true);
//!
//! for entry in &result.flat_tag_list {
//!     println!("{}: {}", entry.name.unwrap_or("?"), entry.display);
//! }
//! ```

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod io;
pub mod render;
pub mod thumbnail;
pub mod vendor;

// Re-export commonly used types
pub use codec::{
    clamp_quality, encode_jpeg, is_valid_quality, ImageCodec, ImageRsCodec, Orientation,
    DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use config::{Cli, EngineOptions, OutputFormat, StripOrder};
pub use engine::{flat_tag_list, Engine, ParseResult};
pub use error::{CodecError, FormatError, IoError, ThumbnailError, TiffError, VendorError};
pub use format::tiff::{
    tag, ByteOrder, Directory, DirectoryKind, DirectoryWalker, Entry, EntryValue, FieldType,
    TagRegistry, TagScope, TiffHeader, ValueReader, WalkState,
};
pub use format::{locate, Container, Location};
pub use io::{ByteSource, MemorySource, ReaderSource};
pub use render::{render_generic, Rule, ValueRenderer};
pub use thumbnail::{Strategy, ThumbnailReconstructor, TiffSynthesizer};
pub use vendor::{CanonDecoder, VendorDecoder, VendorRegistry};
