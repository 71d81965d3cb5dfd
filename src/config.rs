//! Configuration for the engine and the batch CLI.
//!
//! [`EngineOptions`] tunes the library. [`Cli`] is the command line of the
//! `exif-engine` binary and supports:
//! - Command-line arguments via clap
//! - Environment variables with `EXIF_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use exif_engine::config::Cli;
//!
//! let cli = Cli::parse();
//! let options = cli.engine_options();
//! ```
//!
//! # Environment Variables
//!
//! - `EXIF_FORMAT` - Output format, `text` or `json` (default: text)
//! - `EXIF_NO_THUMBNAIL` - Skip thumbnail reconstruction
//! - `EXIF_THUMBNAIL_DIR` - Directory to write thumbnails into
//! - `EXIF_JPEG_QUALITY` - Thumbnail JPEG quality (default: 80)
//! - `EXIF_STRIP_ORDER` - Strip pairing, `declared` or `reversed` (default: declared)
//! - `EXIF_THUMBNAIL_WIDTH` - Fallback thumbnail box width (default: 300)
//! - `EXIF_THUMBNAIL_HEIGHT` - Fallback thumbnail box height (default: 200)

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::codec::{is_valid_quality, DEFAULT_JPEG_QUALITY};
use crate::format::tiff::DEFAULT_MAX_DIRECTORIES;

// =============================================================================
// Default Values
// =============================================================================

/// Default width of the fallback thumbnail box.
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 300;

/// Default height of the fallback thumbnail box.
pub const DEFAULT_THUMBNAIL_HEIGHT: u32 = 200;

// =============================================================================
// Engine Options
// =============================================================================

/// How strip offsets are paired with strip byte counts when rebuilding an
/// uncompressed thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StripOrder {
    /// `offsets[i]` with `counts[i]`
    #[default]
    Declared,

    /// `offsets[n - 1 - i]` with `counts[i]`, as some writers lay strips out
    Reversed,
}

impl StripOrder {
    /// Index into the offsets array for the `i`-th of `n` strips.
    #[inline]
    pub fn offset_index(self, i: usize, n: usize) -> usize {
        match self {
            StripOrder::Declared => i,
            StripOrder::Reversed => n - 1 - i,
        }
    }
}

/// Library-level options for [`crate::Engine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub strip_order: StripOrder,

    /// Box (width, height) the codec fallback scales thumbnails into
    pub thumbnail_box: (u32, u32),

    /// Cap on directories decoded per source
    pub max_directories: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            strip_order: StripOrder::Declared,
            thumbnail_box: (DEFAULT_THUMBNAIL_WIDTH, DEFAULT_THUMBNAIL_HEIGHT),
            max_directories: DEFAULT_MAX_DIRECTORIES,
        }
    }
}

impl EngineOptions {
    pub fn with_strip_order(mut self, strip_order: StripOrder) -> Self {
        self.strip_order = strip_order;
        self
    }

    pub fn with_thumbnail_box(mut self, width: u32, height: u32) -> Self {
        self.thumbnail_box = (width, height);
        self
    }

    pub fn with_max_directories(mut self, max_directories: usize) -> Self {
        self.max_directories = max_directories;
        self
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// Report format of the batch CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `name: value` lines
    #[default]
    Text,

    /// One JSON document per file
    Json,
}

/// exif-engine - EXIF/TIFF metadata and thumbnail extractor.
///
/// Reads the metadata directories of JPEG and TIFF files, renders every known
/// tag to text and optionally reconstructs the embedded thumbnail.
#[derive(Parser, Debug, Clone)]
#[command(name = "exif-engine")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files to parse.
    pub paths: Vec<PathBuf>,

    // =========================================================================
    // Output Configuration
    // =========================================================================
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "EXIF_FORMAT")]
    pub format: OutputFormat,

    /// Print every directory with type, count, value and raw bytes.
    #[arg(long, default_value_t = false)]
    pub all_directories: bool,

    // =========================================================================
    // Thumbnail Configuration
    // =========================================================================
    /// Skip thumbnail reconstruction.
    #[arg(long, default_value_t = false, env = "EXIF_NO_THUMBNAIL")]
    pub no_thumbnail: bool,

    /// Write each reconstructed thumbnail as `<stem>.thumb.jpg` into this directory.
    #[arg(long, env = "EXIF_THUMBNAIL_DIR")]
    pub thumbnail_dir: Option<PathBuf>,

    /// JPEG quality for written thumbnails (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "EXIF_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// Pairing of strip offsets with strip byte counts.
    #[arg(long, value_enum, default_value_t = StripOrder::Declared, env = "EXIF_STRIP_ORDER")]
    pub strip_order: StripOrder,

    /// Width of the box fallback thumbnails are scaled into.
    #[arg(long, default_value_t = DEFAULT_THUMBNAIL_WIDTH, env = "EXIF_THUMBNAIL_WIDTH")]
    pub thumbnail_width: u32,

    /// Height of the box fallback thumbnails are scaled into.
    #[arg(long, default_value_t = DEFAULT_THUMBNAIL_HEIGHT, env = "EXIF_THUMBNAIL_HEIGHT")]
    pub thumbnail_height: u32,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.paths.is_empty() {
            return Err("At least one file path is required".to_string());
        }

        if self.thumbnail_width == 0 || self.thumbnail_height == 0 {
            return Err("thumbnail_width and thumbnail_height must be greater than 0".to_string());
        }

        if !is_valid_quality(self.jpeg_quality) {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }

        if self.no_thumbnail && self.thumbnail_dir.is_some() {
            return Err("--thumbnail-dir cannot be combined with --no-thumbnail".to_string());
        }

        Ok(())
    }

    /// Whether thumbnails should be reconstructed at all.
    pub fn fetch_thumbnail(&self) -> bool {
        !self.no_thumbnail
    }

    /// Engine options selected on the command line.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions::default()
            .with_strip_order(self.strip_order)
            .with_thumbnail_box(self.thumbnail_width, self.thumbnail_height)
    }
}

// =============================================================================
// Tests
// =============================================================================
