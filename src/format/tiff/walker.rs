//! Directory walker.
//!
//! Walking a TIFF structure runs through a fixed sequence of phases:
//!
//! ```text
//! ReadHeader -> WalkBaseChain -> WalkSpecialChildren -> WalkMakerNote -> ResolveValues
//! ```
//!
//! Each phase consumes a [`WalkState`] and returns the updated state. Only a
//! failure before the first base directory is decoded is fatal; every later
//! failure drops the affected directory or entry and the walk continues.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::TiffError;
use crate::io::ByteSource;
use crate::render::ValueRenderer;

use super::directory::{Directory, DirectoryKind, Entry};
use super::parser::{ByteOrder, TiffHeader, IFD_ENTRY_SIZE, TIFF_HEADER_SIZE};
use super::tags::{TagRegistry, TagScope};
use super::values::ValueReader;

/// Maximum number of directories decoded from one source.
///
/// Bounds the work done on malformed or malicious chains.
pub const DEFAULT_MAX_DIRECTORIES: usize = 100;

// =============================================================================
// WalkState
// =============================================================================

/// In-progress result threaded through the walker phases.
#[derive(Debug, Clone)]
pub struct WalkState {
    /// Absolute position of the TIFF header
    pub header_base: u64,

    /// Byte order declared by the header
    pub byte_order: ByteOrder,

    /// Offset of the first base directory, relative to the header base
    pub first_ifd_offset: u32,

    /// Visible directories: the base chain followed by Exif/GPS children
    pub directories: Vec<Directory>,

    /// MakerNote directory, held back until a vendor decoder claims it
    pub maker_note: Option<Directory>,

    /// Absolute offsets of every directory decoded so far
    visited: HashSet<u64>,
}

impl WalkState {
    /// Find a visible directory by name.
    pub fn directory(&self, name: &str) -> Option<&Directory> {
        self.directories.iter().find(|d| d.name == name)
    }

    fn decoded(&self) -> usize {
        self.visited.len()
    }
}

// =============================================================================
// DirectoryWalker
// =============================================================================

/// Walks the directory structure of a TIFF block.
pub struct DirectoryWalker<'r> {
    registry: &'r TagRegistry,
    max_directories: usize,
}

impl<'r> DirectoryWalker<'r> {
    pub fn new(registry: &'r TagRegistry) -> Self {
        Self {
            registry,
            max_directories: DEFAULT_MAX_DIRECTORIES,
        }
    }

    /// Cap the number of directories decoded.
    pub fn with_max_directories(mut self, max_directories: usize) -> Self {
        self.max_directories = max_directories.max(1);
        self
    }

    /// Run every phase against the TIFF block starting at `header_base`.
    ///
    /// # Errors
    /// Returns an error if the header is invalid or the first base directory
    /// cannot be decoded.
    pub fn walk<S: ByteSource>(
        &self,
        source: &mut S,
        header_base: u64,
    ) -> Result<WalkState, TiffError> {
        let state = self.read_header(source, header_base)?;
        let state = self.walk_base_chain(source, state)?;
        let state = self.walk_special_children(source, state);
        let state = self.walk_maker_note(source, state);
        Ok(self.resolve_values(source, state))
    }

    /// Phase 1: parse and validate the header.
    pub fn read_header<S: ByteSource>(
        &self,
        source: &mut S,
        header_base: u64,
    ) -> Result<WalkState, TiffError> {
        let available = source.size().saturating_sub(header_base);
        if available < TIFF_HEADER_SIZE as u64 {
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: available,
            });
        }

        let bytes = source.read_exact_at(header_base, TIFF_HEADER_SIZE)?;
        let header = TiffHeader::parse(&bytes, available)?;

        debug!(
            header_base = header_base,
            byte_order = ?header.byte_order,
            first_ifd = header.first_ifd_offset,
            "Parsed TIFF header"
        );

        Ok(WalkState {
            header_base,
            byte_order: header.byte_order,
            first_ifd_offset: header.first_ifd_offset,
            directories: Vec::new(),
            maker_note: None,
            visited: HashSet::new(),
        })
    }

    /// Phase 2: decode the chain of base directories.
    ///
    /// The chain ends at a zero next-offset, at a cycle, at the directory
    /// cap, or at the first directory that cannot be decoded.
    pub fn walk_base_chain<S: ByteSource>(
        &self,
        source: &mut S,
        mut state: WalkState,
    ) -> Result<WalkState, TiffError> {
        let mut offset = state.first_ifd_offset;
        let mut index = 0;

        while offset != 0 {
            if state.decoded() >= self.max_directories {
                warn!(
                    max = self.max_directories,
                    "Directory cap reached, truncating chain"
                );
                break;
            }

            let absolute = state.header_base + u64::from(offset);
            if !state.visited.insert(absolute) {
                warn!(offset = absolute, "{}", TiffError::DirectoryCycle(absolute));
                break;
            }

            match read_directory(
                source,
                state.byte_order,
                state.header_base,
                offset,
                DirectoryKind::Base(index),
            ) {
                Ok(directory) => {
                    offset = directory.next_offset;
                    state.directories.push(directory);
                    index += 1;
                }
                Err(e) if index == 0 => return Err(e),
                Err(e) => {
                    warn!(
                        directory = index,
                        offset = absolute,
                        "Truncating directory chain: {}",
                        e
                    );
                    break;
                }
            }
        }

        Ok(state)
    }

    /// Phase 3: decode the Exif and GPS directories of every base directory.
    pub fn walk_special_children<S: ByteSource>(
        &self,
        source: &mut S,
        mut state: WalkState,
    ) -> WalkState {
        let pointers: Vec<(DirectoryKind, u32)> = state
            .directories
            .iter()
            .flat_map(|d| {
                [
                    d.children.exif.map(|o| (DirectoryKind::Exif, o)),
                    d.children.gps.map(|o| (DirectoryKind::Gps, o)),
                ]
            })
            .flatten()
            .collect();

        for (kind, offset) in pointers {
            if let Some(directory) = self.read_child(source, &mut state, kind, offset) {
                state.directories.push(directory);
            }
        }

        state
    }

    /// Phase 4: decode the MakerNote directory of the first Exif directory.
    ///
    /// The result is held in [`WalkState::maker_note`] and is not visible
    /// until a vendor decoder turns it into a resolved directory.
    pub fn walk_maker_note<S: ByteSource>(
        &self,
        source: &mut S,
        mut state: WalkState,
    ) -> WalkState {
        let offset = state
            .directories
            .iter()
            .filter(|d| d.kind == DirectoryKind::Exif)
            .find_map(|d| d.children.maker_note);

        if let Some(offset) = offset {
            let maker_note = self.read_child(source, &mut state, DirectoryKind::MakerNote, offset);
            state.maker_note = maker_note;
        }

        state
    }

    /// Phase 5: prune unnamed entries, resolve values and render them.
    pub fn resolve_values<S: ByteSource>(&self, source: &mut S, mut state: WalkState) -> WalkState {
        let renderer = ValueRenderer::new(self.registry);
        let mut reader = ValueReader::new(source, state.byte_order, state.header_base);

        for directory in &mut state.directories {
            let scope = directory.kind.scope();
            resolve_entries(&mut reader, self.registry, &renderer, scope, directory);
        }

        state
    }

    fn read_child<S: ByteSource>(
        &self,
        source: &mut S,
        state: &mut WalkState,
        kind: DirectoryKind,
        offset: u32,
    ) -> Option<Directory> {
        if state.decoded() >= self.max_directories {
            warn!(directory = %kind.name(), "Directory cap reached, skipping");
            return None;
        }

        let absolute = state.header_base + u64::from(offset);
        if !state.visited.insert(absolute) {
            warn!(directory = %kind.name(), offset = absolute, "Directory already decoded, skipping");
            return None;
        }

        match read_directory(source, state.byte_order, state.header_base, offset, kind) {
            Ok(directory) => Some(directory),
            Err(e) => {
                warn!(directory = %kind.name(), offset = absolute, "Skipping directory: {}", e);
                None
            }
        }
    }
}

// =============================================================================
// Directory Decoding
// =============================================================================

/// Decode the directory at `offset` (relative to `header_base`).
///
/// Reads the 2-byte entry count, then the entries and the 4-byte next
/// offset in one bounds-checked read. Pointer tags valid for `kind` are
/// captured as child offsets instead of becoming entries; entries with an
/// unsupported field type are skipped.
pub fn read_directory<S: ByteSource>(
    source: &mut S,
    byte_order: ByteOrder,
    header_base: u64,
    offset: u32,
    kind: DirectoryKind,
) -> Result<Directory, TiffError> {
    let start = header_base + u64::from(offset);
    if source.check_range(start, 2).is_err() {
        return Err(TiffError::InvalidIfdOffset(start));
    }

    let count_bytes = source.read_exact_at(start, 2)?;
    let entry_count = byte_order.read_u16(&count_bytes);

    let entries_len = usize::from(entry_count) * IFD_ENTRY_SIZE;
    let body_len = entries_len + 4;
    if source.check_range(start + 2, body_len as u64).is_err() {
        return Err(TiffError::DirectoryOutOfBounds {
            offset: start,
            entries: entry_count,
        });
    }
    let body = source.read_exact_at(start + 2, body_len)?;

    let mut directory = Directory::new(kind, start);
    for record in body[..entries_len].chunks_exact(IFD_ENTRY_SIZE) {
        let tag_id = byte_order.read_u16(&record[0..2]);
        let field = byte_order.read_u32(&record[8..12]);
        if directory.children.capture(kind, tag_id, field) {
            continue;
        }

        match Entry::parse(record, byte_order) {
            Ok(entry) => directory.entries.push(entry),
            Err(field_type) => {
                debug!(
                    directory = %directory.name,
                    tag = tag_id,
                    field_type = field_type,
                    "Skipping entry with unsupported field type"
                );
            }
        }
    }
    directory.next_offset = byte_order.read_u32(&body[entries_len..]);

    debug!(
        directory = %directory.name,
        offset = start,
        entries = directory.len(),
        next = directory.next_offset,
        "Decoded directory"
    );

    Ok(directory)
}

/// Name, resolve and render the entries of one directory.
///
/// Entries without a name in `scope` are pruned; entries whose value cannot
/// be read are dropped.
pub fn resolve_entries<S: ByteSource>(
    reader: &mut ValueReader<'_, S>,
    registry: &TagRegistry,
    renderer: &ValueRenderer<'_>,
    scope: TagScope,
    directory: &mut Directory,
) {
    let entries = std::mem::take(&mut directory.entries);
    for mut entry in entries {
        let Some(name) = registry.name(scope, entry.tag) else {
            debug!(directory = %directory.name, tag = entry.tag, "Pruning unsupported tag");
            continue;
        };
        entry.name = Some(name);

        if let Err(e) = reader.resolve(&mut entry) {
            warn!(
                directory = %directory.name,
                tag = entry.tag,
                "Dropping entry, value unreadable: {}",
                e
            );
            continue;
        }

        entry.display = renderer.render(scope, &entry);
        directory.entries.push(entry);
    }
}

// =============================================================================
// Tests
// =============================================================================
