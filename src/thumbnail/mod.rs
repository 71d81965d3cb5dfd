//! Thumbnail reconstruction.
//!
//! The thumbnail is rebuilt from the second base directory ("Directory1"):
//!
//! ```text
//! SelectStrategy -> EmbeddedJpeg | SynthesizeTiff | CodecFallback -> OrientationCorrect
//! ```
//!
//! An embedded JPEG preview is preferred, then uncompressed strips wrapped in
//! a synthesized TIFF. If neither is present, or the chosen path fails, the
//! full image is decoded and scaled into the thumbnail box. The result is
//! turned upright using the orientation of "Directory0".

mod synth;

pub use synth::{Patch, TiffSynthesizer};

use image::DynamicImage;
use tracing::{debug, warn};

use crate::codec::{ImageCodec, Orientation};
use crate::config::StripOrder;
use crate::error::ThumbnailError;
use crate::format::tiff::{tag, Directory, ValueReader, WalkState};
use crate::io::ByteSource;

/// Name of the directory holding thumbnail metadata.
pub const THUMBNAIL_DIRECTORY: &str = "Directory1";

// =============================================================================
// Strategy
// =============================================================================

/// How the thumbnail raster is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// JPEGInterchangeFormat / JPEGInterchangeFormatLength preview
    EmbeddedJpeg,
    /// StripOffsets / StripByteCounts wrapped in a new TIFF
    SynthesizeTiff,
    /// Decode the whole image and scale it down
    CodecFallback,
}

impl Strategy {
    /// Pick a strategy from the tags of the thumbnail directory.
    pub fn select(directory: Option<&Directory>) -> Self {
        let Some(directory) = directory else {
            return Strategy::CodecFallback;
        };

        if directory.contains(tag::JPEG_INTERCHANGE_FORMAT)
            && directory.contains(tag::JPEG_INTERCHANGE_FORMAT_LENGTH)
        {
            Strategy::EmbeddedJpeg
        } else if directory.contains(tag::STRIP_OFFSETS)
            && directory.contains(tag::STRIP_BYTE_COUNTS)
        {
            Strategy::SynthesizeTiff
        } else {
            Strategy::CodecFallback
        }
    }
}

// =============================================================================
// ThumbnailReconstructor
// =============================================================================

/// Produces an upright thumbnail raster for a walked source.
pub struct ThumbnailReconstructor<'c, C: ImageCodec> {
    codec: &'c C,
    strip_order: StripOrder,
    thumbnail_box: (u32, u32),
}

impl<'c, C: ImageCodec> ThumbnailReconstructor<'c, C> {
    pub fn new(codec: &'c C, strip_order: StripOrder, thumbnail_box: (u32, u32)) -> Self {
        Self {
            codec,
            strip_order,
            thumbnail_box,
        }
    }

    /// Reconstruct the thumbnail.
    ///
    /// Never fails: every error is logged and yields `None`.
    pub fn reconstruct<S: ByteSource>(
        &self,
        source: &mut S,
        state: &WalkState,
    ) -> Option<DynamicImage> {
        let directory = state.directory(THUMBNAIL_DIRECTORY);
        let strategy = Strategy::select(directory);
        debug!(strategy = ?strategy, "Selected thumbnail strategy");

        let attempt = match (strategy, directory) {
            (Strategy::EmbeddedJpeg, Some(directory)) => {
                self.embedded_jpeg(source, state, directory)
            }
            (Strategy::SynthesizeTiff, Some(directory)) => {
                self.synthesize_tiff(source, state, directory)
            }
            _ => self.codec_fallback(source),
        };

        let raster = match attempt {
            Ok(raster) => raster,
            Err(e) if strategy != Strategy::CodecFallback => {
                warn!(strategy = ?strategy, "Thumbnail strategy failed, decoding full image: {}", e);
                match self.codec_fallback(source) {
                    Ok(raster) => raster,
                    Err(e) => {
                        warn!("Thumbnail unavailable: {}", e);
                        return None;
                    }
                }
            }
            Err(e) => {
                warn!("Thumbnail unavailable: {}", e);
                return None;
            }
        };

        Some(self.orientation_correct(raster, state))
    }

    /// Decode the preview block at `HeaderBase + JPEGInterchangeFormat`.
    fn embedded_jpeg<S: ByteSource>(
        &self,
        source: &mut S,
        state: &WalkState,
        directory: &Directory,
    ) -> Result<DynamicImage, ThumbnailError> {
        let mut reader = ValueReader::new(source, state.byte_order, state.header_base);

        let offset = first_u32(
            &mut reader,
            directory,
            tag::JPEG_INTERCHANGE_FORMAT,
            "JPEGInterchangeFormat",
        )?;
        let length = first_u32(
            &mut reader,
            directory,
            tag::JPEG_INTERCHANGE_FORMAT_LENGTH,
            "JPEGInterchangeFormatLength",
        )?;

        let preview = reader.read_block(offset, u64::from(length))?;
        debug!(offset = offset, length = length, "Decoding embedded JPEG preview");

        Ok(self.codec.decode(&preview)?)
    }

    /// Rebuild the strips as a standalone TIFF and decode it.
    fn synthesize_tiff<S: ByteSource>(
        &self,
        source: &mut S,
        state: &WalkState,
        directory: &Directory,
    ) -> Result<DynamicImage, ThumbnailError> {
        let mut reader = ValueReader::new(source, state.byte_order, state.header_base);
        let blob = TiffSynthesizer::new(state.byte_order, self.strip_order)
            .synthesize(directory, &mut reader)?;

        Ok(self.codec.decode(&blob)?)
    }

    /// Decode the whole source and scale it into the thumbnail box.
    fn codec_fallback<S: ByteSource>(&self, source: &mut S) -> Result<DynamicImage, ThumbnailError> {
        let size = source.size();
        let len = usize::try_from(size).map_err(|_| ThumbnailError::BlobTooLarge(usize::MAX))?;
        let bytes = source.read_exact_at(0, len)?;

        let full = self.codec.decode(&bytes)?;
        let (width, height) = self.thumbnail_box;
        debug!(
            width = full.width(),
            height = full.height(),
            "Scaling full image into thumbnail box"
        );

        Ok(self.codec.scale_to_fit(&full, width, height))
    }

    /// Apply the "Directory0" orientation; absent or unknown values are a no-op.
    fn orientation_correct(&self, raster: DynamicImage, state: &WalkState) -> DynamicImage {
        let orientation = state
            .directory("Directory0")
            .and_then(|d| d.entry(tag::ORIENTATION))
            .and_then(|e| e.value.as_ref())
            .and_then(|v| v.first_integer())
            .and_then(Orientation::from_code);

        match orientation {
            Some(orientation) => self.codec.rotate_flip(raster, orientation),
            None => raster,
        }
    }
}

/// First value of a SHORT or LONG entry.
fn first_u32<S: ByteSource>(
    reader: &mut ValueReader<'_, S>,
    directory: &Directory,
    tag_id: u16,
    name: &'static str,
) -> Result<u32, ThumbnailError> {
    let entry = directory
        .entry(tag_id)
        .ok_or(ThumbnailError::MissingTag(name))?;
    reader
        .read_u32_array(entry)?
        .first()
        .copied()
        .ok_or(ThumbnailError::MissingTag(name))
}

// =============================================================================
// Tests
// =============================================================================
