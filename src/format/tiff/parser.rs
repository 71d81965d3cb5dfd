//! TIFF header parsing and the byte-order codec.
//!
//! Every multi-byte value in a TIFF structure is interpreted through the
//! [`ByteOrder`] declared in the header, so the same type both reads values
//! from the source and encodes values into synthesized blobs.
//!
//! # TIFF Header Structure
//!
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Magic (42 = 0x002A)
//! Bytes 4-7: Offset to first IFD, relative to the start of this header
//! ```
//!
//! The header's absolute position in the file ("header base") is recorded by
//! the caller; every offset found later is relative to it.

use serde::Serialize;

use crate::error::TiffError;

// =============================================================================
// Constants
// =============================================================================

/// Magic bytes indicating little-endian byte order ("II" for Intel)
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// Magic bytes indicating big-endian byte order ("MM" for Motorola)
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

/// The fixed magic number following the byte order
pub const TIFF_MAGIC: u16 = 42;

/// Size of the TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of one IFD entry: tag (2) + type (2) + count (4) + value/offset (4)
pub const IFD_ENTRY_SIZE: usize = 12;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a TIFF structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// The two marker bytes that open a header in this order.
    pub const fn marker(self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => [b'I', b'I'],
            ByteOrder::BigEndian => [b'M', b'M'],
        }
    }

    /// Read a u16 from the first two bytes of a slice.
    ///
    /// # Panics
    /// Panics if the slice has fewer than 2 bytes.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        let raw = [bytes[0], bytes[1]];
        match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(raw),
            ByteOrder::BigEndian => u16::from_be_bytes(raw),
        }
    }

    /// Read a u32 from the first four bytes of a slice.
    ///
    /// # Panics
    /// Panics if the slice has fewer than 4 bytes.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(raw),
            ByteOrder::BigEndian => u32::from_be_bytes(raw),
        }
    }

    /// Read a two's-complement i32 from the first four bytes of a slice.
    #[inline]
    pub fn read_i32(self, bytes: &[u8]) -> i32 {
        self.read_u32(bytes) as i32
    }

    /// Split an 8-byte rational into its numerator and denominator.
    #[inline]
    pub fn read_rational(self, bytes: &[u8]) -> (u32, u32) {
        (self.read_u32(&bytes[0..4]), self.read_u32(&bytes[4..8]))
    }

    /// Split an 8-byte signed rational into its numerator and denominator.
    #[inline]
    pub fn read_srational(self, bytes: &[u8]) -> (i32, i32) {
        (self.read_i32(&bytes[0..4]), self.read_i32(&bytes[4..8]))
    }

    /// Encode a u16 in this byte order.
    #[inline]
    pub fn encode_u16(self, value: u16) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => value.to_le_bytes(),
            ByteOrder::BigEndian => value.to_be_bytes(),
        }
    }

    /// Encode a u32 in this byte order.
    #[inline]
    pub fn encode_u32(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrder::LittleEndian => value.to_le_bytes(),
            ByteOrder::BigEndian => value.to_be_bytes(),
        }
    }

    /// Overwrite four bytes at `position` with `value`.
    ///
    /// # Panics
    /// Panics if `position + 4` exceeds the buffer length.
    #[inline]
    pub fn patch_u32(self, buf: &mut [u8], position: usize, value: u32) {
        buf[position..position + 4].copy_from_slice(&self.encode_u32(value));
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values that follow
    pub byte_order: ByteOrder,

    /// Offset of the first IFD, relative to the header
    pub first_ifd_offset: u32,
}

impl TiffHeader {
    /// Parse a TIFF header from raw bytes.
    ///
    /// # Arguments
    /// * `bytes` - Raw header bytes (at least 8)
    /// * `available` - Bytes available from the header start to the end of the source
    ///
    /// # Errors
    /// - `FileTooSmall` if there aren't enough bytes for the header
    /// - `InvalidByteOrder` if the first two bytes are not II or MM
    /// - `InvalidMagic` if the magic is not 42
    /// - `InvalidIfdOffset` if the first IFD offset is outside the source
    pub fn parse(bytes: &[u8], available: u64) -> Result<Self, TiffError> {
        if bytes.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        // Byte order is checked as a fixed pattern, independent of endianness
        let marker = u16::from_le_bytes([bytes[0], bytes[1]]);
        let byte_order = match marker {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidByteOrder(marker)),
        };

        let magic = byte_order.read_u16(&bytes[2..4]);
        if magic != TIFF_MAGIC {
            return Err(TiffError::InvalidMagic(magic));
        }

        let first_ifd_offset = byte_order.read_u32(&bytes[4..8]);
        if u64::from(first_ifd_offset) >= available {
            return Err(TiffError::InvalidIfdOffset(u64::from(first_ifd_offset)));
        }

        Ok(TiffHeader {
            byte_order,
            first_ifd_offset,
        })
    }

    /// Encode a header in this byte order pointing at `first_ifd_offset`.
    pub fn encode(byte_order: ByteOrder, first_ifd_offset: u32) -> [u8; TIFF_HEADER_SIZE] {
        let mut out = [0u8; TIFF_HEADER_SIZE];
        out[0..2].copy_from_slice(&byte_order.marker());
        out[2..4].copy_from_slice(&byte_order.encode_u16(TIFF_MAGIC));
        out[4..8].copy_from_slice(&byte_order.encode_u32(first_ifd_offset));
        out
    }
}

// =============================================================================
// Tests
// =============================================================================
