//! Image codec seam.
//!
//! Decoding compressed rasters and rotating, flipping or scaling them is
//! delegated to an [`ImageCodec`]. [`ImageRsCodec`] implements it with the
//! `image` crate; tests and embedders can supply their own.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, Rgba, RgbaImage};

use crate::error::CodecError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Transparent white, used to pad scaled thumbnails.
const PADDING: Rgba<u8> = Rgba([255, 255, 255, 0]);

// =============================================================================
// Orientation
// =============================================================================

/// EXIF orientation (tag 0x0112), values 1 through 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    MirrorHorizontal,
    Rotate180,
    MirrorVertical,
    /// Mirror horizontal and rotate 270 CW
    Transpose,
    Rotate90,
    /// Mirror horizontal and rotate 90 CW
    Transverse,
    Rotate270,
}

impl Orientation {
    /// Orientation for a tag value; `None` for values outside 1-8.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Orientation::Normal),
            2 => Some(Orientation::MirrorHorizontal),
            3 => Some(Orientation::Rotate180),
            4 => Some(Orientation::MirrorVertical),
            5 => Some(Orientation::Transpose),
            6 => Some(Orientation::Rotate90),
            7 => Some(Orientation::Transverse),
            8 => Some(Orientation::Rotate270),
            _ => None,
        }
    }
}

// =============================================================================
// ImageCodec
// =============================================================================

/// Raster operations the engine needs from an image library.
pub trait ImageCodec {
    /// Decode an encoded image (JPEG, TIFF, ...).
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError>;

    /// Apply an orientation so the image displays upright.
    fn rotate_flip(&self, image: DynamicImage, orientation: Orientation) -> DynamicImage;

    /// Scale to fit inside `width` x `height`, keeping the aspect ratio, and
    /// center the result on a canvas of exactly that size.
    fn scale_to_fit(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage;
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRsCodec;

impl ImageRsCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for ImageRsCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        if reader.format().is_none() {
            return Err(CodecError::Decode("unrecognized image format".to_string()));
        }

        reader.decode().map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn rotate_flip(&self, image: DynamicImage, orientation: Orientation) -> DynamicImage {
        match orientation {
            Orientation::Normal => image,
            Orientation::MirrorHorizontal => image.fliph(),
            Orientation::Rotate180 => image.rotate180(),
            Orientation::MirrorVertical => image.flipv(),
            Orientation::Transpose => image.rotate90().fliph(),
            Orientation::Rotate90 => image.rotate90(),
            Orientation::Transverse => image.rotate270().fliph(),
            Orientation::Rotate270 => image.rotate270(),
        }
    }

    fn scale_to_fit(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let scaled = image.resize(width, height, FilterType::Triangle).to_rgba8();

        let mut canvas = RgbaImage::from_pixel(width, height, PADDING);
        let x = (width.saturating_sub(scaled.width()) / 2) as i64;
        let y = (height.saturating_sub(scaled.height()) / 2) as i64;
        imageops::overlay(&mut canvas, &scaled, x, y);

        DynamicImage::ImageRgba8(canvas)
    }
}

// =============================================================================
// JPEG Output
// =============================================================================

/// Encode an image as JPEG at the given quality.
///
/// Quality is clamped to 1-100. Alpha is dropped.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Bytes, CodecError> {
    let quality = clamp_quality(quality);
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());

    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| CodecError::Encode(e.to_string()))?;

    Ok(Bytes::from(output))
}

/// Validate JPEG quality parameter.
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
