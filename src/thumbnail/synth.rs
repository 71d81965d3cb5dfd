//! Standalone TIFF synthesis for uncompressed thumbnails.
//!
//! A thumbnail stored as strips cannot be handed to a decoder directly: its
//! strip offsets point into the enclosing file. [`TiffSynthesizer`] rebuilds
//! the thumbnail directory as a self-contained TIFF blob:
//!
//! ```text
//! +--------+-------+------------+------+----------------+------------+--------+
//! | header | count | entries    | next | entry payloads | strip slots| strips |
//! | 8      | 2     | 12 * n     | 4    | ...            | 4 * k      | ...    |
//! +--------+-------+------------+------+----------------+------------+--------+
//! ```
//!
//! The buffer only ever grows. Every field that needs a position known later
//! is recorded as a [`Patch`] and written once all appends are done.

use bytes::Bytes;
use tracing::debug;

use crate::config::StripOrder;
use crate::error::ThumbnailError;
use crate::format::tiff::{
    tag, ByteOrder, Directory, Entry, FieldType, TiffHeader, ValueReader, IFD_ENTRY_SIZE,
    TIFF_HEADER_SIZE,
};
use crate::io::ByteSource;

/// A deferred write of `bytes` at `position` in the blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub position: usize,
    pub bytes: [u8; 4],
}

/// Builds a standalone TIFF from a directory with strip data.
#[derive(Debug, Clone, Copy)]
pub struct TiffSynthesizer {
    byte_order: ByteOrder,
    strip_order: StripOrder,
}

impl TiffSynthesizer {
    pub fn new(byte_order: ByteOrder, strip_order: StripOrder) -> Self {
        Self {
            byte_order,
            strip_order,
        }
    }

    /// Synthesize a TIFF blob from `directory`, fetching external payloads
    /// and strip data through `reader`.
    ///
    /// The blob keeps the source byte order, places its only directory at
    /// offset 8 and rewrites StripOffsets as LONG values pointing into the
    /// blob.
    ///
    /// # Errors
    /// Fails if either strip tag is missing, the two arrays differ in
    /// length, any block lies outside the source, or the blob would exceed
    /// the 4 GiB TIFF offset range.
    pub fn synthesize<S: ByteSource>(
        &self,
        directory: &Directory,
        reader: &mut ValueReader<'_, S>,
    ) -> Result<Bytes, ThumbnailError> {
        let order = self.byte_order;

        let offsets_entry = directory
            .entry(tag::STRIP_OFFSETS)
            .ok_or(ThumbnailError::MissingTag("StripOffsets"))?;
        let counts_entry = directory
            .entry(tag::STRIP_BYTE_COUNTS)
            .ok_or(ThumbnailError::MissingTag("StripByteCounts"))?;

        let offsets = reader.read_u32_array(offsets_entry)?;
        let counts = reader.read_u32_array(counts_entry)?;
        if offsets.is_empty() || offsets.len() != counts.len() {
            return Err(ThumbnailError::InvalidStripLayout {
                offsets: offsets.len(),
                counts: counts.len(),
            });
        }
        let strips = offsets.len();

        let entry_count = u16::try_from(directory.len())
            .map_err(|_| ThumbnailError::BlobTooLarge(directory.len() * IFD_ENTRY_SIZE))?;

        let mut blob = Vec::with_capacity(
            TIFF_HEADER_SIZE + 2 + directory.len() * IFD_ENTRY_SIZE + 4,
        );
        blob.extend_from_slice(&TiffHeader::encode(order, TIFF_HEADER_SIZE as u32));
        blob.extend_from_slice(&order.encode_u16(entry_count));

        let mut patches = Vec::new();
        let mut payloads: Vec<(usize, Bytes)> = Vec::new();
        let mut strip_field = None;

        for entry in &directory.entries {
            let field = blob.len() + 8;

            if entry.tag == tag::STRIP_OFFSETS {
                blob.extend_from_slice(&order.encode_u16(entry.tag));
                blob.extend_from_slice(&order.encode_u16(FieldType::Long as u16));
                blob.extend_from_slice(&order.encode_u32(strips as u32));
                blob.extend_from_slice(&[0; 4]);
                strip_field = Some(field);
            } else if entry.is_external {
                blob.extend_from_slice(&entry.record[..8]);
                blob.extend_from_slice(&[0; 4]);
                payloads.push((field, self.payload(entry, reader)?));
            } else {
                blob.extend_from_slice(&entry.record);
            }
        }
        blob.extend_from_slice(&[0; 4]);

        for (field, payload) in payloads {
            // Values start on a word boundary
            if blob.len() % 2 == 1 {
                blob.push(0);
            }
            patches.push(self.patch(field, &blob)?);
            blob.extend_from_slice(&payload);
        }

        // Only reachable with a StripOffsets entry; `directory.entry` found one
        let strip_field = strip_field.ok_or(ThumbnailError::MissingTag("StripOffsets"))?;
        let slots: Vec<usize> = if strips == 1 {
            vec![strip_field]
        } else {
            if blob.len() % 2 == 1 {
                blob.push(0);
            }
            patches.push(self.patch(strip_field, &blob)?);
            (0..strips)
                .map(|_| {
                    let slot = blob.len();
                    blob.extend_from_slice(&[0; 4]);
                    slot
                })
                .collect()
        };

        for (i, &slot) in slots.iter().enumerate() {
            let offset = offsets[self.strip_order.offset_index(i, strips)];
            let data = reader.read_block(offset, u64::from(counts[i]))?;
            patches.push(self.patch(slot, &blob)?);
            blob.extend_from_slice(&data);
        }

        if u32::try_from(blob.len()).is_err() {
            return Err(ThumbnailError::BlobTooLarge(blob.len()));
        }
        for patch in &patches {
            blob[patch.position..patch.position + 4].copy_from_slice(&patch.bytes);
        }

        debug!(
            entries = entry_count,
            strips = strips,
            patches = patches.len(),
            size = blob.len(),
            "Synthesized thumbnail TIFF"
        );

        Ok(Bytes::from(blob))
    }

    /// Patch writing the current end of `blob` into the field at `position`.
    fn patch(&self, position: usize, blob: &[u8]) -> Result<Patch, ThumbnailError> {
        let cursor =
            u32::try_from(blob.len()).map_err(|_| ThumbnailError::BlobTooLarge(blob.len()))?;
        Ok(Patch {
            position,
            bytes: self.byte_order.encode_u32(cursor),
        })
    }

    /// External payload of an entry, reusing the bytes resolved by the walker.
    fn payload<S: ByteSource>(
        &self,
        entry: &Entry,
        reader: &mut ValueReader<'_, S>,
    ) -> Result<Bytes, ThumbnailError> {
        if entry.raw.len() as u64 == entry.payload_size() {
            return Ok(entry.raw.clone());
        }
        Ok(reader.read_payload(entry)?)
    }
}

// =============================================================================
// Tests
// =============================================================================
