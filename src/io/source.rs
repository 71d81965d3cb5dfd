use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;

use crate::error::IoError;

/// Trait for reading byte ranges from a seekable resource.
///
/// Reads take `&mut self`: a source has a single cursor, so one parse owns it
/// exclusively for its whole duration and reads happen in the order the
/// directories declare them.
pub trait ByteSource {
    /// Read exactly `len` bytes starting at absolute `offset`.
    ///
    /// Returns an error if the range is out of bounds or if the read fails.
    fn read_exact_at(&mut self, offset: u64, len: usize) -> Result<Bytes, IoError>;

    /// Total size of the resource in bytes.
    fn size(&self) -> u64;

    /// Identifier for logging (usually the file path).
    fn identifier(&self) -> &str;

    /// Check that `len` bytes at `offset` lie within the source.
    fn check_range(&self, offset: u64, len: u64) -> Result<(), IoError> {
        let size = self.size();
        match offset.checked_add(len) {
            Some(end) if end <= size => Ok(()),
            _ => Err(IoError::RangeOutOfBounds {
                offset,
                requested: len,
                size,
            }),
        }
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_exact_at(&mut self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        (**self).read_exact_at(offset, len)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn identifier(&self) -> &str {
        (**self).identifier()
    }
}

// =============================================================================
// In-memory source
// =============================================================================

/// A byte source over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
    identifier: String,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>, identifier: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            identifier: identifier.into(),
        }
    }

    /// The whole buffer.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl ByteSource for MemorySource {
    fn read_exact_at(&mut self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        self.check_range(offset, len as u64)?;
        let start = offset as usize;
        Ok(self.data.slice(start..start + len))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// Seekable reader source
// =============================================================================

/// A byte source over any `Read + Seek` stream, typically an open file.
///
/// The stream is dropped (and the file closed) together with the source.
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: R,
    size: u64,
    identifier: String,
}

impl ReaderSource<BufReader<File>> {
    /// Open a file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| IoError::NotFound(format!("{}: {}", path.display(), e)))?;
        ReaderSource::new(BufReader::new(file), path.display().to_string())
    }
}

impl<R: Read + Seek> ReaderSource<R> {
    /// Wrap a stream, discovering its length by seeking to the end.
    pub fn new(mut inner: R, identifier: impl Into<String>) -> Result<Self, IoError> {
        let size = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            inner,
            size,
            identifier: identifier.into(),
        })
    }

    /// Give back the wrapped stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteSource for ReaderSource<R> {
    fn read_exact_at(&mut self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        self.check_range(offset, len as u64)?;
        self.inner.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
