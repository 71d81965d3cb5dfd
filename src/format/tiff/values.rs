//! Typed value resolution.
//!
//! A value is stored inline in the entry's 4-byte field when its payload fits
//! (`count * unit_size <= 4`); otherwise the field holds an offset, relative
//! to the header base, of an external block. Inline values never touch the
//! source.

use bytes::Bytes;

use crate::error::TiffError;
use crate::io::ByteSource;

use super::directory::{Entry, EntryValue};
use super::parser::ByteOrder;
use super::tags::FieldType;

// =============================================================================
// ValueReader
// =============================================================================

/// Reads entry payloads and header-relative blocks from a byte source.
pub struct ValueReader<'a, S: ByteSource> {
    source: &'a mut S,
    byte_order: ByteOrder,
    header_base: u64,
}

impl<'a, S: ByteSource> ValueReader<'a, S> {
    /// Create a new ValueReader.
    pub fn new(source: &'a mut S, byte_order: ByteOrder, header_base: u64) -> Self {
        Self {
            source,
            byte_order,
            header_base,
        }
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    #[inline]
    pub fn header_base(&self) -> u64 {
        self.header_base
    }

    /// Read `len` bytes at `offset` relative to the header base.
    ///
    /// The range is checked against the source length before any read.
    pub fn read_block(&mut self, offset: u32, len: u64) -> Result<Bytes, TiffError> {
        let start = self.header_base + u64::from(offset);
        let size = self.source.size();
        if self.source.check_range(start, len).is_err() || len > usize::MAX as u64 {
            return Err(TiffError::ValueOutOfBounds {
                offset: start,
                len,
                size,
            });
        }
        Ok(self.source.read_exact_at(start, len as usize)?)
    }

    /// Read the payload bytes of an entry.
    ///
    /// For inline values, returns the leading bytes of the value field.
    /// For external values, fetches the block from the source.
    pub fn read_payload(&mut self, entry: &Entry) -> Result<Bytes, TiffError> {
        let size = entry.payload_size();
        if entry.is_external {
            let offset = entry.value_offset(self.byte_order);
            self.read_block(offset, size)
        } else {
            Ok(Bytes::copy_from_slice(&entry.value_field()[..size as usize]))
        }
    }

    /// Fill in an entry's raw bytes and typed value.
    pub fn resolve(&mut self, entry: &mut Entry) -> Result<(), TiffError> {
        let raw = self.read_payload(entry)?;
        entry.value = Some(decode_value(entry.field_type, &raw, self.byte_order));
        entry.raw = raw;
        Ok(())
    }

    /// Read an entry's values as unsigned offsets or counts.
    ///
    /// Accepts SHORT and LONG entries, as used by strip and preview tags.
    pub fn read_u32_array(&mut self, entry: &Entry) -> Result<Vec<u32>, TiffError> {
        let bytes = self.read_payload(entry)?;
        let byte_order = self.byte_order;
        match entry.field_type {
            FieldType::Short => Ok(bytes
                .chunks_exact(2)
                .map(|c| u32::from(byte_order.read_u16(c)))
                .collect()),
            FieldType::Long => Ok(bytes.chunks_exact(4).map(|c| byte_order.read_u32(c)).collect()),
            other => Err(TiffError::UnknownFieldType(other as u16)),
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a payload into its typed form.
///
/// `raw` must hold exactly the entry's payload.
pub fn decode_value(field_type: FieldType, raw: &[u8], byte_order: ByteOrder) -> EntryValue {
    match field_type {
        FieldType::Byte | FieldType::Undefined => EntryValue::Bytes(raw.to_vec()),
        FieldType::Ascii => EntryValue::Text(decode_ascii(raw)),
        FieldType::Short => EntryValue::Integers(
            raw.chunks_exact(2)
                .map(|c| i64::from(byte_order.read_u16(c)))
                .collect(),
        ),
        FieldType::Long => EntryValue::Integers(
            raw.chunks_exact(4)
                .map(|c| i64::from(byte_order.read_u32(c)))
                .collect(),
        ),
        FieldType::SLong => EntryValue::Integers(
            raw.chunks_exact(4)
                .map(|c| i64::from(byte_order.read_i32(c)))
                .collect(),
        ),
        FieldType::Rational => EntryValue::Rationals(
            raw.chunks_exact(8)
                .map(|c| {
                    let (n, d) = byte_order.read_rational(c);
                    (i64::from(n), i64::from(d))
                })
                .collect(),
        ),
        FieldType::SRational => EntryValue::Rationals(
            raw.chunks_exact(8)
                .map(|c| {
                    let (n, d) = byte_order.read_srational(c);
                    (i64::from(n), i64::from(d))
                })
                .collect(),
        ),
    }
}

/// Decode ASCII text, dropping trailing NUL terminators.
///
/// Embedded NULs are kept; some tags use them as separators.
fn decode_ascii(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

// =============================================================================
// Tests
// =============================================================================
