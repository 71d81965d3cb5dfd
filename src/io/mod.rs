//! Byte sources the engine reads from.
//!
//! The engine only ever issues absolute-position, fixed-length reads, so any
//! seekable stream with a known length can back a parse.

mod source;

pub use source::{ByteSource, MemorySource, ReaderSource};
