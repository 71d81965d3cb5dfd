//! Container detection.
//!
//! Metadata lives either in a bare TIFF file, whose header sits at byte 0,
//! or in a JPEG file, where the TIFF block is wrapped in an APP1 segment:
//!
//! ```text
//! FF D8                          SOI
//! FF E0 <len> ...                optional APP0 (JFIF), skipped by its length
//! FF E1 <len> "Exif\0\0" <TIFF>  APP1; the TIFF header follows the identifier
//! ```
//!
//! Segment lengths are big-endian and include the two length bytes.

use serde::Serialize;

use crate::error::FormatError;
use crate::io::ByteSource;

// =============================================================================
// Constants
// =============================================================================

/// JPEG markers used while locating the metadata segment
pub mod marker {
    pub const P: u8 = 0xFF;
    pub const SOI: u8 = 0xD8;
    pub const APP0: u8 = 0xE0;
    pub const APP1: u8 = 0xE1;
}

/// Start-of-image signature
const JPEG_SIGNATURE: [u8; 2] = [marker::P, marker::SOI];

/// Identifier opening an Exif APP1 segment
pub const EXIF_ID: [u8; 6] = *b"Exif\0\0";

/// Marker (2) + length (2) + identifier (6)
const APP1_PREFIX_LEN: usize = 10;

// =============================================================================
// Container
// =============================================================================

/// Kind of file the metadata was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Container {
    /// Bare TIFF structure starting at byte 0
    Tiff,
    /// JPEG with an Exif APP1 segment
    Jpeg,
}

impl Container {
    pub const fn name(&self) -> &'static str {
        match self {
            Container::Tiff => "TIFF",
            Container::Jpeg => "JPEG",
        }
    }
}

/// Where the TIFF block starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub container: Container,

    /// Absolute position of the TIFF header
    pub header_base: u64,
}

/// Check if bytes start with the JPEG start-of-image marker.
#[inline]
pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&JPEG_SIGNATURE)
}

/// Locate the TIFF block in a source.
///
/// Sources that do not open with SOI are assumed to be bare TIFF; the
/// header itself is validated later by the walker.
///
/// # Errors
/// - `NoMetadata` if the source is empty, or if a JPEG has no Exif APP1
///   segment where one is expected
/// - `Io` if a read fails
pub fn locate<S: ByteSource>(source: &mut S) -> Result<Location, FormatError> {
    if source.size() < JPEG_SIGNATURE.len() as u64 {
        return Err(no_metadata("source too small"));
    }

    let signature = source.read_exact_at(0, JPEG_SIGNATURE.len())?;
    if !is_jpeg(&signature) {
        return Ok(Location {
            container: Container::Tiff,
            header_base: 0,
        });
    }

    let mut position: u64 = 2;

    // An APP0 segment may precede APP1
    if source.check_range(position, 4).is_ok() {
        let segment = source.read_exact_at(position, 4)?;
        if segment[0] == marker::P && segment[1] == marker::APP0 {
            let length = u16::from_be_bytes([segment[2], segment[3]]);
            position += 2 + u64::from(length);
        }
    }

    if source.check_range(position, APP1_PREFIX_LEN as u64).is_err() {
        return Err(no_metadata("JPEG ends before the metadata segment"));
    }
    let prefix = source.read_exact_at(position, APP1_PREFIX_LEN)?;

    if prefix[0] != marker::P || prefix[1] != marker::APP1 {
        return Err(no_metadata("no APP1 segment after SOI"));
    }
    if prefix[4..10] != EXIF_ID {
        return Err(no_metadata("APP1 segment is not Exif"));
    }

    Ok(Location {
        container: Container::Jpeg,
        header_base: position + APP1_PREFIX_LEN as u64,
    })
}

fn no_metadata(reason: &str) -> FormatError {
    FormatError::NoMetadata {
        reason: reason.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
