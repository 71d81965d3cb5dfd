//! Directory data model.
//!
//! A [`Directory`] is one decoded IFD: its kind, its entries in declared
//! order, the child-directory offsets captured while scanning it, and the
//! link to the next directory in the chain.
//!
//! # IFD Entry Structure
//!
//! ```text
//! Bytes 0-1:  Tag ID
//! Bytes 2-3:  Field type
//! Bytes 4-7:  Count (number of values, not bytes)
//! Bytes 8-11: Value (if it fits in 4 bytes) or offset to the value block
//! ```

use bytes::Bytes;
use serde::{Serialize, Serializer};

use super::parser::{ByteOrder, IFD_ENTRY_SIZE};
use super::tags::{tag, FieldType, TagScope};

// =============================================================================
// DirectoryKind
// =============================================================================

/// What a directory holds and where it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DirectoryKind {
    /// N-th directory of the base chain
    Base(usize),
    /// Exif sub-directory
    Exif,
    /// GPS sub-directory
    Gps,
    /// Raw MakerNote directory, before vendor decoding
    MakerNote,
    /// MakerNote decoded by a vendor decoder
    Vendor(&'static str),
}

impl DirectoryKind {
    /// Display name used in results ("Directory0", "ExifDirectory", ...).
    pub fn name(self) -> String {
        match self {
            DirectoryKind::Base(index) => format!("Directory{}", index),
            DirectoryKind::Exif => "ExifDirectory".to_string(),
            DirectoryKind::Gps => "GpsDirectory".to_string(),
            DirectoryKind::MakerNote => "MakerNoteDirectory".to_string(),
            DirectoryKind::Vendor(_) => "MakerNote".to_string(),
        }
    }

    /// Tag scope this directory's entries are named and rendered in.
    pub fn scope(self) -> TagScope {
        match self {
            DirectoryKind::Base(_) | DirectoryKind::Exif => TagScope::Tiff,
            DirectoryKind::Gps => TagScope::Gps,
            // Vendor tags only make sense once the make is known
            DirectoryKind::MakerNote => TagScope::Vendor(""),
            DirectoryKind::Vendor(make) => TagScope::Vendor(make),
        }
    }

    /// Whether pointer tags found here are captured as child offsets.
    pub fn captures_pointers(self) -> bool {
        matches!(self, DirectoryKind::Base(_) | DirectoryKind::Exif)
    }
}

/// Child-directory offsets captured while scanning a directory.
///
/// Offsets are relative to the header base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChildOffsets {
    pub exif: Option<u32>,
    pub gps: Option<u32>,
    pub maker_note: Option<u32>,
}

impl ChildOffsets {
    /// Record `value` if `tag` is a pointer tag valid in `kind`.
    ///
    /// Returns `true` when the tag was captured and must not become an entry.
    /// Only the first pointer of each kind is kept.
    pub fn capture(&mut self, kind: DirectoryKind, tag_id: u16, value: u32) -> bool {
        if !kind.captures_pointers() {
            return false;
        }
        let slot = match tag_id {
            tag::EXIF_POINTER => &mut self.exif,
            tag::GPS_POINTER => &mut self.gps,
            tag::MAKER_NOTE if kind == DirectoryKind::Exif => &mut self.maker_note,
            _ => return false,
        };
        slot.get_or_insert(value);
        true
    }
}

// =============================================================================
// EntryValue
// =============================================================================

/// Strongly-typed decoded value of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "values")]
pub enum EntryValue {
    /// BYTE and UNDEFINED
    Bytes(#[serde(serialize_with = "serialize_hex")] Vec<u8>),
    /// ASCII with the trailing NUL removed
    Text(String),
    /// SHORT, LONG and SLONG
    Integers(Vec<i64>),
    /// RATIONAL and SRATIONAL as numerator/denominator pairs
    Rationals(Vec<(i64, i64)>),
}

impl EntryValue {
    /// First value as an integer, if the value is integral.
    ///
    /// Byte values yield their first byte.
    pub fn first_integer(&self) -> Option<i64> {
        match self {
            EntryValue::Integers(values) => values.first().copied(),
            EntryValue::Bytes(bytes) => bytes.first().map(|&b| i64::from(b)),
            _ => None,
        }
    }

    pub fn integers(&self) -> Option<&[i64]> {
        match self {
            EntryValue::Integers(values) => Some(values),
            _ => None,
        }
    }

    pub fn rationals(&self) -> Option<&[(i64, i64)]> {
        match self {
            EntryValue::Rationals(values) => Some(values),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            EntryValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            EntryValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

// =============================================================================
// Entry
// =============================================================================

/// A single entry of a directory.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    /// Tag ID
    pub tag: u16,

    /// Display name from the tag registry (set once the entry survives pruning)
    pub name: Option<&'static str>,

    /// Field type
    pub field_type: FieldType,

    /// Number of values
    pub count: u32,

    /// Original 12-byte record as read from the directory
    #[serde(serialize_with = "serialize_hex")]
    pub record: [u8; IFD_ENTRY_SIZE],

    /// Whether the value lives in an external block rather than inline
    pub is_external: bool,

    /// Decoded payload bytes
    #[serde(serialize_with = "serialize_hex")]
    pub raw: Bytes,

    /// Decoded value, once resolved
    pub value: Option<EntryValue>,

    /// Rendered display string
    pub display: String,
}

impl Entry {
    /// Decode a 12-byte record.
    ///
    /// Returns `Err(type)` with the raw field type if it is not one of the
    /// supported types.
    pub fn parse(record: &[u8], byte_order: ByteOrder) -> Result<Self, u16> {
        let tag = byte_order.read_u16(&record[0..2]);
        let type_raw = byte_order.read_u16(&record[2..4]);
        let count = byte_order.read_u32(&record[4..8]);
        let field_type = FieldType::from_u16(type_raw).ok_or(type_raw)?;

        let mut raw_record = [0u8; IFD_ENTRY_SIZE];
        raw_record.copy_from_slice(&record[..IFD_ENTRY_SIZE]);

        Ok(Entry {
            tag,
            name: None,
            field_type,
            count,
            record: raw_record,
            is_external: !field_type.fits_inline(count),
            raw: Bytes::new(),
            value: None,
            display: String::new(),
        })
    }

    /// The 4-byte value-or-offset field, undecoded.
    #[inline]
    pub fn value_field(&self) -> &[u8] {
        &self.record[8..12]
    }

    /// The value field interpreted as an offset (relative to the header base).
    #[inline]
    pub fn value_offset(&self, byte_order: ByteOrder) -> u32 {
        byte_order.read_u32(self.value_field())
    }

    /// Total payload size in bytes.
    #[inline]
    pub fn payload_size(&self) -> u64 {
        self.field_type.payload_size(self.count).unwrap_or(u64::MAX)
    }

    /// The original record as uppercase hex.
    pub fn record_hex(&self) -> String {
        hex::encode_upper(self.record)
    }

    /// The decoded payload as uppercase hex.
    pub fn raw_hex(&self) -> String {
        hex::encode_upper(&self.raw)
    }
}

// =============================================================================
// Directory
// =============================================================================

/// A decoded directory (IFD).
#[derive(Debug, Clone, Serialize)]
pub struct Directory {
    /// What this directory is
    pub kind: DirectoryKind,

    /// Display name ("Directory0", "ExifDirectory", ...)
    pub name: String,

    /// Absolute position of the directory in the source
    pub offset: u64,

    /// Entries in declared order
    pub entries: Vec<Entry>,

    /// Child offsets captured while scanning entries
    pub children: ChildOffsets,

    /// Offset of the next directory in the chain (0 terminates)
    pub next_offset: u32,
}

impl Directory {
    /// Create an empty directory of the given kind.
    pub fn new(kind: DirectoryKind, offset: u64) -> Self {
        Self {
            kind,
            name: kind.name(),
            offset,
            entries: Vec::new(),
            children: ChildOffsets::default(),
            next_offset: 0,
        }
    }

    /// Find the first entry with a tag.
    pub fn entry(&self, tag_id: u16) -> Option<&Entry> {
        self.entries.iter().find(|e| e.tag == tag_id)
    }

    /// Check if the directory has an entry with a tag.
    pub fn contains(&self, tag_id: u16) -> bool {
        self.entry(tag_id).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn serialize_hex<S, T>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&hex::encode_upper(bytes))
}

// =============================================================================
// Tests
// =============================================================================
