//! Test utilities for integration tests.
//!
//! This module provides a byte-level TIFF builder, JPEG container wrappers
//! and small source/image helpers.

use std::cell::RefCell;
use std::rc::Rc;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{GrayImage, Luma, Rgb, RgbImage};

use exif_engine::error::IoError;
use exif_engine::{ByteOrder, ByteSource, MemorySource};

// =============================================================================
// Tracking Source
// =============================================================================

/// A byte source that records every read request.
///
/// Clones share the request log, so a test can keep one handle while the
/// engine consumes the other.
#[derive(Clone)]
pub struct TrackingSource {
    inner: MemorySource,
    requests: Rc<RefCell<Vec<(u64, usize)>>>,
}

impl TrackingSource {
    pub fn new(data: Vec<u8>, identifier: impl Into<String>) -> Self {
        Self {
            inner: MemorySource::new(data, identifier),
            requests: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<(u64, usize)> {
        self.requests.borrow().clone()
    }

    /// Whether any read touched `[offset, offset + len)`.
    pub fn touched(&self, offset: u64, len: u64) -> bool {
        self.requests
            .borrow()
            .iter()
            .any(|&(o, l)| o < offset + len && offset < o + l as u64)
    }
}

impl ByteSource for TrackingSource {
    fn read_exact_at(&mut self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        self.requests.borrow_mut().push((offset, len));
        self.inner.read_exact_at(offset, len)
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn identifier(&self) -> &str {
        self.inner.identifier()
    }
}

// =============================================================================
// Test JPEG Creation
// =============================================================================

/// Create a test JPEG image with a simple gradient pattern.
pub fn create_test_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let img = GrayImage::from_fn(width, height, |x, y| {
        let val = ((x + y) % 256) as u8;
        Luma([val])
    });

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.encode_image(&img).unwrap();
    buf
}

/// Create a test RGB JPEG image.
pub fn create_test_rgb_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let r = (x % 256) as u8;
        let g = (y % 256) as u8;
        let b = ((x + y) % 256) as u8;
        Rgb([r, g, b])
    });

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.encode_image(&img).unwrap();
    buf
}

/// Check if data is a JPEG stream.
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() >= 4 && data[0..2] == [0xFF, 0xD8] && data[data.len() - 2..] == [0xFF, 0xD9]
}

// =============================================================================
// JPEG Containers
// =============================================================================

/// APP1 segment carrying a TIFF block.
pub fn app1_segment(tiff: &[u8]) -> Vec<u8> {
    let length = (2 + 6 + tiff.len()) as u16;
    let mut out = vec![0xFF, 0xE1];
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out
}

/// Minimal JFIF APP0 segment.
pub fn app0_segment() -> Vec<u8> {
    let mut out = vec![0xFF, 0xE0, 0x00, 0x10];
    out.extend_from_slice(b"JFIF\0");
    out.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    out
}

/// SOI, optional APP0, then APP1 with the TIFF block and an EOI.
///
/// The TIFF header starts at 12, or at 30 with APP0.
pub fn exif_jpeg(tiff: &[u8], with_app0: bool) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    if with_app0 {
        out.extend(app0_segment());
    }
    out.extend(app1_segment(tiff));
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// A decodable JPEG with an APP1 TIFF block inserted right after SOI.
pub fn jpeg_with_exif(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    let mut out = jpeg[0..2].to_vec();
    out.extend(app1_segment(tiff));
    out.extend_from_slice(&jpeg[2..]);
    out
}

// =============================================================================
// TIFF File Builders
// =============================================================================

/// Payload of one entry, laid out by [`TiffBuilder::build`].
#[derive(Clone)]
enum Payload {
    Bytes(Vec<u8>),
    /// Offset of another IFD of the builder
    Ifd(usize),
    /// Offsets of blobs, as LONGs
    Blobs(Vec<usize>),
    /// Length of a blob, as a LONG
    BlobLength(usize),
}

impl Payload {
    fn len(&self) -> usize {
        match self {
            Payload::Bytes(bytes) => bytes.len(),
            Payload::Ifd(_) | Payload::BlobLength(_) => 4,
            Payload::Blobs(blobs) => blobs.len() * 4,
        }
    }
}

#[derive(Clone)]
struct EntryBuilder {
    tag: u16,
    field_type: u16,
    count: u32,
    payload: Payload,
}

/// Builder for one IFD.
#[derive(Clone, Default)]
pub struct IfdBuilder {
    entries: Vec<EntryBuilder>,
    next_override: Option<u32>,
    order: Option<ByteOrder>,
}

impl IfdBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry with raw payload bytes (already in the file's byte order).
    pub fn raw(mut self, tag: u16, field_type: u16, count: u32, bytes: Vec<u8>) -> Self {
        self.entries.push(EntryBuilder {
            tag,
            field_type,
            count,
            payload: Payload::Bytes(bytes),
        });
        self
    }

    pub fn ascii(self, tag: u16, text: &str) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        let count = bytes.len() as u32;
        self.raw(tag, 2, count, bytes)
    }

    pub fn bytes(self, tag: u16, field_type: u16, bytes: &[u8]) -> Self {
        self.raw(tag, field_type, bytes.len() as u32, bytes.to_vec())
    }

    pub fn shorts(mut self, tag: u16, values: &[u16]) -> Self {
        self.push_numbers(tag, 3, values.iter().map(|&v| Number::U16(v)).collect());
        self
    }

    pub fn short(self, tag: u16, value: u16) -> Self {
        self.shorts(tag, &[value])
    }

    pub fn longs(mut self, tag: u16, values: &[u32]) -> Self {
        self.push_numbers(tag, 4, values.iter().map(|&v| Number::U32(v)).collect());
        self
    }

    pub fn long(self, tag: u16, value: u32) -> Self {
        self.longs(tag, &[value])
    }

    pub fn rationals(mut self, tag: u16, values: &[(u32, u32)]) -> Self {
        let numbers = values
            .iter()
            .flat_map(|&(n, d)| [Number::U32(n), Number::U32(d)])
            .collect();
        self.push_numbers(tag, 5, numbers);
        self.entries.last_mut().unwrap().count = values.len() as u32;
        self
    }

    pub fn srationals(mut self, tag: u16, values: &[(i32, i32)]) -> Self {
        let numbers = values
            .iter()
            .flat_map(|&(n, d)| [Number::U32(n as u32), Number::U32(d as u32)])
            .collect();
        self.push_numbers(tag, 10, numbers);
        self.entries.last_mut().unwrap().count = values.len() as u32;
        self
    }

    /// LONG pointer to another IFD of the same builder.
    pub fn pointer(mut self, tag: u16, ifd: usize) -> Self {
        self.entries.push(EntryBuilder {
            tag,
            field_type: 4,
            count: 1,
            payload: Payload::Ifd(ifd),
        });
        self
    }

    /// LONG offsets of blobs (a preview or strips).
    pub fn blob_offsets(mut self, tag: u16, blobs: &[usize]) -> Self {
        self.entries.push(EntryBuilder {
            tag,
            field_type: 4,
            count: blobs.len() as u32,
            payload: Payload::Blobs(blobs.to_vec()),
        });
        self
    }

    /// LONG length of a blob.
    pub fn blob_length(mut self, tag: u16, blob: usize) -> Self {
        self.entries.push(EntryBuilder {
            tag,
            field_type: 4,
            count: 1,
            payload: Payload::BlobLength(blob),
        });
        self
    }

    /// Force the next-IFD field (for cycles and dangling links).
    pub fn next(mut self, offset: u32) -> Self {
        self.next_override = Some(offset);
        self
    }

    fn push_numbers(&mut self, tag: u16, field_type: u16, numbers: Vec<Number>) {
        // Encoded at build time, once the byte order is known
        let count = numbers.len() as u32;
        self.entries.push(EntryBuilder {
            tag,
            field_type,
            count,
            payload: Payload::Bytes(Number::encode_all(&numbers, self.order)),
        });
    }

    fn size(&self) -> u32 {
        (2 + self.entries.len() * 12 + 4) as u32
    }
}

#[derive(Clone, Copy)]
enum Number {
    U16(u16),
    U32(u32),
}

impl Number {
    fn encode_all(numbers: &[Number], order: Option<ByteOrder>) -> Vec<u8> {
        let order = order.unwrap_or(ByteOrder::LittleEndian);
        numbers
            .iter()
            .flat_map(|n| match *n {
                Number::U16(v) => order.encode_u16(v).to_vec(),
                Number::U32(v) => order.encode_u32(v).to_vec(),
            })
            .collect()
    }
}

/// Builder for creating test TIFF blocks.
///
/// IFDs are laid out right after the header in the order they were added,
/// followed by external values and then blobs. The base chain links the IFDs
/// listed in [`chain`](TiffBuilder::chain).
pub struct TiffBuilder {
    byte_order: ByteOrder,
    ifds: Vec<IfdBuilder>,
    chain: Vec<usize>,
    blobs: Vec<Vec<u8>>,
}

impl TiffBuilder {
    pub fn new() -> Self {
        Self::with_byte_order(ByteOrder::LittleEndian)
    }

    pub fn with_byte_order(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            ifds: Vec::new(),
            chain: Vec::new(),
            blobs: Vec::new(),
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Start an IFD whose numeric values use this builder's byte order.
    pub fn ifd(&self) -> IfdBuilder {
        IfdBuilder {
            order: Some(self.byte_order),
            ..IfdBuilder::default()
        }
    }

    /// Add an IFD and return its index.
    pub fn add_ifd(&mut self, ifd: IfdBuilder) -> usize {
        self.ifds.push(ifd);
        self.ifds.len() - 1
    }

    /// Add a blob and return its index.
    pub fn add_blob(&mut self, data: Vec<u8>) -> usize {
        self.blobs.push(data);
        self.blobs.len() - 1
    }

    /// Set the base chain, in order.
    pub fn chain(&mut self, ifds: &[usize]) -> &mut Self {
        self.chain = ifds.to_vec();
        self
    }

    /// Offset of an IFD in the built block.
    pub fn ifd_offset(&self, ifd: usize) -> u32 {
        8 + self.ifds[..ifd].iter().map(|i| i.size()).sum::<u32>()
    }

    /// Offset of a blob in the built block.
    pub fn blob_offset(&self, blob: usize) -> u32 {
        self.layout().1[blob]
    }

    /// External value offsets per IFD entry, and blob offsets.
    fn layout(&self) -> (Vec<Vec<Option<u32>>>, Vec<u32>) {
        let mut cursor = 8 + self.ifds.iter().map(|i| i.size()).sum::<u32>();

        let mut externals = Vec::new();
        for ifd in &self.ifds {
            let mut offsets = Vec::new();
            for entry in &ifd.entries {
                let len = entry.payload.len() as u32;
                if len > 4 {
                    cursor += cursor % 2;
                    offsets.push(Some(cursor));
                    cursor += len;
                } else {
                    offsets.push(None);
                }
            }
            externals.push(offsets);
        }

        let mut blobs = Vec::new();
        for blob in &self.blobs {
            cursor += cursor % 2;
            blobs.push(cursor);
            cursor += blob.len() as u32;
        }

        (externals, blobs)
    }

    /// Build the TIFF block.
    pub fn build(&self) -> Vec<u8> {
        let order = self.byte_order;
        let (externals, blob_offsets) = self.layout();
        let first = self.chain.first().map_or(0, |&i| self.ifd_offset(i));

        let mut data = Vec::new();
        data.extend_from_slice(&order.marker());
        data.extend_from_slice(&order.encode_u16(42));
        data.extend_from_slice(&order.encode_u32(first));

        let payload_bytes = |payload: &Payload| -> Vec<u8> {
            match payload {
                Payload::Bytes(bytes) => bytes.clone(),
                Payload::Ifd(ifd) => order.encode_u32(self.ifd_offset(*ifd)).to_vec(),
                Payload::Blobs(blobs) => blobs
                    .iter()
                    .flat_map(|&b| order.encode_u32(blob_offsets[b]))
                    .collect(),
                Payload::BlobLength(blob) => {
                    order.encode_u32(self.blobs[*blob].len() as u32).to_vec()
                }
            }
        };

        for (index, ifd) in self.ifds.iter().enumerate() {
            data.extend_from_slice(&order.encode_u16(ifd.entries.len() as u16));
            for (entry, external) in ifd.entries.iter().zip(&externals[index]) {
                data.extend_from_slice(&order.encode_u16(entry.tag));
                data.extend_from_slice(&order.encode_u16(entry.field_type));
                data.extend_from_slice(&order.encode_u32(entry.count));
                match external {
                    Some(offset) => data.extend_from_slice(&order.encode_u32(*offset)),
                    None => {
                        let mut field = payload_bytes(&entry.payload);
                        field.resize(4, 0);
                        data.extend_from_slice(&field);
                    }
                }
            }

            let next = ifd.next_override.unwrap_or_else(|| {
                self.chain
                    .iter()
                    .position(|&i| i == index)
                    .and_then(|p| self.chain.get(p + 1))
                    .map_or(0, |&n| self.ifd_offset(n))
            });
            data.extend_from_slice(&order.encode_u32(next));
        }

        for (ifd, offsets) in self.ifds.iter().zip(&externals) {
            for (entry, offset) in ifd.entries.iter().zip(offsets) {
                if let Some(offset) = offset {
                    data.resize(*offset as usize, 0);
                    data.extend(payload_bytes(&entry.payload));
                }
            }
        }

        for (blob, offset) in self.blobs.iter().zip(&blob_offsets) {
            data.resize(*offset as usize, 0);
            data.extend_from_slice(blob);
        }

        data
    }
}

impl Default for TiffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Canned Files
// =============================================================================

/// Tag IDs used across the tests.
pub mod tags {
    pub const IMAGE_WIDTH: u16 = 0x0100;
    pub const IMAGE_LENGTH: u16 = 0x0101;
    pub const BITS_PER_SAMPLE: u16 = 0x0102;
    pub const COMPRESSION: u16 = 0x0103;
    pub const PHOTOMETRIC: u16 = 0x0106;
    pub const MAKE: u16 = 0x010F;
    pub const MODEL: u16 = 0x0110;
    pub const STRIP_OFFSETS: u16 = 0x0111;
    pub const ORIENTATION: u16 = 0x0112;
    pub const SAMPLES_PER_PIXEL: u16 = 0x0115;
    pub const ROWS_PER_STRIP: u16 = 0x0116;
    pub const STRIP_BYTE_COUNTS: u16 = 0x0117;
    pub const X_RESOLUTION: u16 = 0x011A;
    pub const JPEG_OFFSET: u16 = 0x0201;
    pub const JPEG_LENGTH: u16 = 0x0202;
    pub const EXPOSURE_TIME: u16 = 0x829A;
    pub const F_NUMBER: u16 = 0x829D;
    pub const EXIF_POINTER: u16 = 0x8769;
    pub const GPS_POINTER: u16 = 0x8825;
    pub const EXPOSURE_PROGRAM: u16 = 0x8822;
    pub const SHUTTER_SPEED: u16 = 0x9201;
    pub const APERTURE: u16 = 0x9202;
    pub const MAKER_NOTE: u16 = 0x927C;
    pub const GPS_LATITUDE_REF: u16 = 0x0001;
    pub const GPS_LATITUDE: u16 = 0x0002;
    pub const CANON_MODEL_ID: u16 = 0x0010;
    pub const CANON_PROCESSING_INFO: u16 = 0x00A0;
}

/// A camera-style TIFF block: Directory0 (Make, Model, Orientation, Exif and
/// GPS pointers), an Exif directory with a MakerNote, a GPS directory and a
/// MakerNote with ProcessingInfo.
pub fn camera_tiff(byte_order: ByteOrder, make: &str, orientation: u16) -> Vec<u8> {
    let mut builder = TiffBuilder::with_byte_order(byte_order);

    let mut processing = [0u16; 14];
    processing[0] = 28;
    processing[8] = 0x8003;
    processing[10] = 0x83;

    // Indices are fixed by insertion order: 0 base, 1 exif, 2 gps, 3 maker note
    let base = builder.ifd()
        .ascii(tags::MAKE, make)
        .ascii(tags::MODEL, "Test Camera")
        .short(tags::ORIENTATION, orientation)
        .pointer(tags::EXIF_POINTER, 1)
        .pointer(tags::GPS_POINTER, 2);
    let exif = builder.ifd()
        .rationals(tags::EXPOSURE_TIME, &[(1, 125)])
        .short(tags::EXPOSURE_PROGRAM, 2)
        .srationals(tags::SHUTTER_SPEED, &[(12, 1)])
        .pointer(tags::MAKER_NOTE, 3);
    let gps = builder.ifd()
        .ascii(tags::GPS_LATITUDE_REF, "N")
        .rationals(tags::GPS_LATITUDE, &[(40, 1), (26, 1), (46, 1)]);
    let maker_note = builder.ifd()
        .long(tags::CANON_MODEL_ID, 0x8000_0281)
        .shorts(tags::CANON_PROCESSING_INFO, &processing);

    let base = builder.add_ifd(base);
    builder.add_ifd(exif);
    builder.add_ifd(gps);
    builder.add_ifd(maker_note);
    builder.chain(&[base]);
    builder.build()
}

/// Append a Directory1 to a builder that points at an embedded JPEG preview.
pub fn add_jpeg_thumbnail(builder: &mut TiffBuilder, preview: Vec<u8>) -> usize {
    let blob = builder.add_blob(preview);
    let ifd = builder.ifd()
        .short(tags::COMPRESSION, 6)
        .blob_offsets(tags::JPEG_OFFSET, &[blob])
        .blob_length(tags::JPEG_LENGTH, blob);
    builder.add_ifd(ifd)
}

/// Append a Directory1 holding an uncompressed RGB image, one row per strip.
pub fn add_strip_thumbnail(builder: &mut TiffBuilder, image: &RgbImage) -> usize {
    let (width, height) = image.dimensions();
    let row = (width * 3) as usize;
    let strips: Vec<usize> = image
        .as_raw()
        .chunks(row)
        .map(|r| builder.add_blob(r.to_vec()))
        .collect();

    let counts = vec![row as u32; strips.len()];
    let ifd = builder.ifd()
        .long(tags::IMAGE_WIDTH, width)
        .long(tags::IMAGE_LENGTH, height)
        .shorts(tags::BITS_PER_SAMPLE, &[8, 8, 8])
        .short(tags::COMPRESSION, 1)
        .short(tags::PHOTOMETRIC, 2)
        .blob_offsets(tags::STRIP_OFFSETS, &strips)
        .short(tags::SAMPLES_PER_PIXEL, 3)
        .long(tags::ROWS_PER_STRIP, 1)
        .longs(tags::STRIP_BYTE_COUNTS, &counts)
        .rationals(tags::X_RESOLUTION, &[(72, 1)]);
    builder.add_ifd(ifd)
}
