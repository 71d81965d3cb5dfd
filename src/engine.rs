//! Engine façade.
//!
//! [`Engine::parse`] runs the whole pipeline against one byte source:
//!
//! ```text
//! locate -> walk directories -> vendor MakerNote -> thumbnail -> flat tag list
//! ```
//!
//! Only a missing or invalid metadata block is reported as an error. Every
//! later failure is logged and shows up as absent data.

use std::time::{Duration, Instant};

use image::DynamicImage;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::{ImageCodec, ImageRsCodec};
use crate::config::EngineOptions;
use crate::error::FormatError;
use crate::format::tiff::{
    tag, ByteOrder, Directory, DirectoryKind, DirectoryWalker, Entry, TagRegistry, WalkState,
};
use crate::format::{locate, Container, Location};
use crate::io::ByteSource;
use crate::thumbnail::ThumbnailReconstructor;
use crate::vendor::{VendorDecoder, VendorRegistry};

// =============================================================================
// Parse Result
// =============================================================================

/// Everything extracted from one source.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    /// Identifier of the parsed source
    pub source: String,

    /// Whether a valid metadata block was found
    pub metadata_found: bool,

    /// Container the metadata was found in
    pub container: Option<Container>,

    /// Byte order of the metadata block
    pub byte_order: Option<ByteOrder>,

    /// Decoded directories: base chain, Exif/GPS children, then the vendor MakerNote
    pub directories: Vec<Directory>,

    /// Displayable entries of Directory0, the Exif directories and the MakerNote
    pub flat_tag_list: Vec<Entry>,

    /// Upright thumbnail, if one was requested and could be produced
    #[serde(skip)]
    pub thumbnail: Option<DynamicImage>,

    /// Why no metadata was found
    pub error: Option<String>,

    /// Wall time spent in [`Engine::parse`]
    pub elapsed: Duration,
}

impl ParseResult {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            metadata_found: false,
            container: None,
            byte_order: None,
            directories: Vec::new(),
            flat_tag_list: Vec::new(),
            thumbnail: None,
            error: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Find a directory by name.
    pub fn directory(&self, name: &str) -> Option<&Directory> {
        self.directories.iter().find(|d| d.name == name)
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Metadata and thumbnail extraction engine.
///
/// The engine holds only immutable tables, so one instance can serve many
/// sources; each call to [`parse`](Engine::parse) owns its source.
///
/// # Example
///
/// ```ignore
/// use exif_engine::{Engine, ReaderSource};
///
/// let engine = Engine::new();
/// let source = ReaderSource::open("photo.jpg")?;
/// let result = engine.parse(source, true);
///
/// for entry in &result.flat_tag_list {
///     println!("{}: {}", entry.name.unwrap_or("?"), entry.display);
/// }
/// ```
pub struct Engine<C: ImageCodec = ImageRsCodec> {
    options: EngineOptions,
    tags: TagRegistry,
    vendors: VendorRegistry,
    codec: C,
}

impl Engine<ImageRsCodec> {
    /// Create an engine with default options and every built-in table.
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self::with_codec(options, ImageRsCodec::new())
    }
}

impl Default for Engine<ImageRsCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ImageCodec> Engine<C> {
    /// Create an engine that delegates raster work to `codec`.
    pub fn with_codec(options: EngineOptions, codec: C) -> Self {
        Self {
            options,
            tags: TagRegistry::standard(),
            vendors: VendorRegistry::standard(),
            codec,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Tag names and renderers, for registering additional tags.
    pub fn tags_mut(&mut self) -> &mut TagRegistry {
        &mut self.tags
    }

    /// Register a MakerNote decoder, replacing any for the same make.
    pub fn register_vendor(&mut self, decoder: Box<dyn VendorDecoder>) {
        self.vendors.register(decoder);
    }

    /// Parse one source.
    ///
    /// Never fails: a source without valid metadata yields
    /// `metadata_found == false` and the reason in `error`.
    pub fn parse<S: ByteSource>(&self, mut source: S, fetch_thumbnail: bool) -> ParseResult {
        let started = Instant::now();
        let mut result = ParseResult::new(source.identifier());

        let (location, mut state) = match self.read_metadata(&mut source) {
            Ok(found) => found,
            Err(e) => {
                warn!(source = %result.source, "No metadata: {}", e);
                result.error = Some(e.to_string());
                result.elapsed = started.elapsed();
                return result;
            }
        };

        result.metadata_found = true;
        result.container = Some(location.container);
        result.byte_order = Some(state.byte_order);

        let maker_note = self.decode_maker_note(&mut source, &mut state);

        if fetch_thumbnail {
            let reconstructor = ThumbnailReconstructor::new(
                &self.codec,
                self.options.strip_order,
                self.options.thumbnail_box,
            );
            result.thumbnail = reconstructor.reconstruct(&mut source, &state);
        }

        result.directories = state.directories;
        result.directories.extend(maker_note);
        result.flat_tag_list = flat_tag_list(&result.directories);
        result.elapsed = started.elapsed();

        info!(
            source = %result.source,
            directories = result.directories.len(),
            tags = result.flat_tag_list.len(),
            thumbnail = result.thumbnail.is_some(),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Parsed metadata"
        );

        result
    }

    /// Locate the metadata block and walk its directories.
    fn read_metadata<S: ByteSource>(
        &self,
        source: &mut S,
    ) -> Result<(Location, WalkState), FormatError> {
        let location = locate(source)?;
        debug!(
            container = location.container.name(),
            header_base = location.header_base,
            "Located metadata"
        );

        let state = DirectoryWalker::new(&self.tags)
            .with_max_directories(self.options.max_directories)
            .walk(source, location.header_base)?;

        Ok((location, state))
    }

    /// Hand the held-back MakerNote to the decoder for the camera make.
    fn decode_maker_note<S: ByteSource>(
        &self,
        source: &mut S,
        state: &mut WalkState,
    ) -> Option<Directory> {
        let maker_note = state.maker_note.take()?;

        let make = state
            .directory("Directory0")
            .and_then(|d| d.entry(tag::MAKE))
            .and_then(|e| e.value.as_ref())
            .and_then(|v| v.text())
            .unwrap_or("");

        let Some(decoder) = self.vendors.resolve(make) else {
            debug!(make = make, "No MakerNote decoder for camera make");
            return None;
        };

        match decoder.decode(maker_note, source, state.byte_order, state.header_base) {
            Ok(directory) => Some(directory),
            Err(e) => {
                warn!(make = make, "Dropping MakerNote: {}", e);
                None
            }
        }
    }
}

impl<C: ImageCodec> std::fmt::Debug for Engine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("vendors", &self.vendors)
            .finish()
    }
}

// =============================================================================
// Flat Tag List
// =============================================================================

/// Displayable entries of "Directory0", every "ExifDirectory" and the vendor
/// "MakerNote", in that order.
///
/// Strip tags and entries rendering to blank text are left out.
pub fn flat_tag_list(directories: &[Directory]) -> Vec<Entry> {
    let base = directories.iter().filter(|d| d.kind == DirectoryKind::Base(0));
    let exif = directories.iter().filter(|d| d.kind == DirectoryKind::Exif);
    let maker_note = directories
        .iter()
        .filter(|d| matches!(d.kind, DirectoryKind::Vendor(_)));

    base.chain(exif)
        .chain(maker_note)
        .flat_map(|d| d.entries.iter())
        .filter(|e| e.tag != tag::STRIP_OFFSETS && e.tag != tag::STRIP_BYTE_COUNTS)
        .filter(|e| !e.display.trim().is_empty())
        .cloned()
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
