//! Binary format parsing.
//!
//! [`container`] finds where the TIFF block starts (bare TIFF or JPEG APP1);
//! [`tiff`] decodes the header, the directory chain and entry values.

pub mod container;
pub mod tiff;

pub use container::{is_jpeg, locate, Container, Location, EXIF_ID};
