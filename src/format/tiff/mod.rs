//! TIFF structure parsing.
//!
//! # Key Concepts
//!
//! - **Byte order**: the header declares its endianness (II = little-endian,
//!   MM = big-endian). Every multi-byte value is read through it.
//!
//! - **Header base**: the absolute position of the header. Every offset in
//!   the structure is relative to it, which matters when the TIFF block is
//!   embedded in a JPEG APP1 segment.
//!
//! - **IFD (Image File Directory)**: a counted list of 12-byte entries and a
//!   link to the next directory. Pointer entries lead to the Exif, GPS and
//!   MakerNote sub-directories.
//!
//! - **Inline vs offset values**: small values are stored inline in the
//!   entry, larger values in a block the entry points at.

mod directory;
mod parser;
mod tags;
mod values;
mod walker;

pub use directory::{ChildOffsets, Directory, DirectoryKind, Entry, EntryValue};
pub use parser::{ByteOrder, TiffHeader, IFD_ENTRY_SIZE, TIFF_HEADER_SIZE, TIFF_MAGIC};
pub use tags::{tag, FieldType, TagRegistry, TagScope, GPS_TAG_NAMES, TIFF_TAG_NAMES};
pub use values::{decode_value, ValueReader};
pub use walker::{
    read_directory, resolve_entries, DirectoryWalker, WalkState, DEFAULT_MAX_DIRECTORIES,
};
