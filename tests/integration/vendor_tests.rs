//! Vendor MakerNote tests.
//!
//! Tests verify:
//! - The Canon decoder names and renders its tags
//! - Unknown makes produce no MakerNote and no error
//! - Decoders can be registered for new makes
//! - A failing decoder only drops the MakerNote

use exif_engine::{
    render_generic, ByteOrder, ByteSource, Directory, DirectoryKind, Engine, MemorySource,
    ParseResult, ValueReader, VendorDecoder, VendorError,
};

use super::test_utils::{camera_tiff, tags, IfdBuilder, TiffBuilder};

fn parse(data: Vec<u8>) -> ParseResult {
    Engine::new().parse(MemorySource::new(data, "vendor"), false)
}

/// Directory0 -> Exif -> MakerNote, with the MakerNote built by `note`.
fn tiff_with_maker_note(make: &str, note: impl FnOnce(IfdBuilder) -> IfdBuilder) -> Vec<u8> {
    let mut builder = TiffBuilder::new();
    let base = builder
        .ifd()
        .ascii(tags::MAKE, make)
        .pointer(tags::EXIF_POINTER, 1);
    let base = builder.add_ifd(base);
    let exif = builder
        .ifd()
        .short(tags::EXPOSURE_PROGRAM, 2)
        .pointer(tags::MAKER_NOTE, 2);
    builder.add_ifd(exif);
    let note = note(builder.ifd());
    builder.add_ifd(note);
    builder.chain(&[base]);
    builder.build()
}

/// Resolves every MakerNote entry under a single generic name.
struct GenericDecoder {
    make: &'static str,
}

impl VendorDecoder for GenericDecoder {
    fn make(&self) -> &'static str {
        self.make
    }

    fn decode(
        &self,
        maker_note: Directory,
        source: &mut dyn ByteSource,
        byte_order: ByteOrder,
        header_base: u64,
    ) -> Result<Directory, VendorError> {
        let mut directory = Directory::new(DirectoryKind::Vendor(self.make), maker_note.offset);
        let mut source = source;
        let mut reader = ValueReader::new(&mut source, byte_order, header_base);

        for mut entry in maker_note.entries {
            reader.resolve(&mut entry)?;
            entry.name = Some("VendorTag");
            if let Some(value) = entry.value.as_ref() {
                entry.display = render_generic(entry.field_type, value);
            }
            directory.entries.push(entry);
        }
        Ok(directory)
    }
}

struct FailingDecoder;

impl VendorDecoder for FailingDecoder {
    fn make(&self) -> &'static str {
        "nikon"
    }

    fn decode(
        &self,
        _maker_note: Directory,
        _source: &mut dyn ByteSource,
        _byte_order: ByteOrder,
        _header_base: u64,
    ) -> Result<Directory, VendorError> {
        Err(VendorError::Decode("unsupported record".to_string()))
    }
}

// =============================================================================
// Canon
// =============================================================================

#[test]
fn test_canon_processing_info() {
    let result = parse(camera_tiff(ByteOrder::LittleEndian, "Canon", 1));

    let note = result.directory("MakerNote").expect("maker note");
    assert_eq!(note.kind, DirectoryKind::Vendor("canon"));

    let info = note.entry(tags::CANON_PROCESSING_INFO).unwrap();
    assert_eq!(info.name, Some("ProcessingInfo"));
    assert_eq!(
        info.display,
        "White Balance: Custom, Tungsten, Picture Style: Landscape"
    );
    assert_eq!(note.entry(tags::CANON_MODEL_ID).unwrap().name, Some("CanonModelID"));
}

#[test]
fn test_canon_big_endian() {
    let result = parse(camera_tiff(ByteOrder::BigEndian, "Canon", 1));

    let note = result.directory("MakerNote").expect("maker note");
    let info = note.entry(tags::CANON_PROCESSING_INFO).unwrap();
    assert_eq!(
        info.display,
        "White Balance: Custom, Tungsten, Picture Style: Landscape"
    );
}

#[test]
fn test_make_matched_ignoring_case_and_padding() {
    let result = parse(camera_tiff(ByteOrder::LittleEndian, " CANON ", 1));
    assert!(result.directory("MakerNote").is_some());
}

#[test]
fn test_canon_denylisted_tag_dropped() {
    let data = tiff_with_maker_note("Canon", |note| {
        note.long(0x0019, 7).long(tags::CANON_MODEL_ID, 0x8000_0281)
    });
    let result = parse(data);

    let note = result.directory("MakerNote").expect("maker note");
    assert!(!note.contains(0x0019));
    assert!(note.contains(tags::CANON_MODEL_ID));
}

#[test]
fn test_canon_unknown_tags_pruned() {
    let data = tiff_with_maker_note("Canon", |note| {
        note.long(0x7FFF, 1).long(tags::CANON_MODEL_ID, 0x8000_0281)
    });
    let result = parse(data);

    let note = result.directory("MakerNote").expect("maker note");
    assert_eq!(note.len(), 1);
}

#[test]
fn test_canon_without_readable_entries_dropped() {
    let data = tiff_with_maker_note("Canon", |note| note.long(0x0019, 7));
    let result = parse(data);

    assert!(result.metadata_found);
    assert!(result.error.is_none());
    assert!(result.directory("MakerNote").is_none());
    assert!(result.directory("ExifDirectory").is_some());
}

// =============================================================================
// Unknown Makes
// =============================================================================

#[test]
fn test_unknown_make_yields_no_maker_note() {
    let result = parse(camera_tiff(ByteOrder::LittleEndian, "Nikon", 1));

    assert!(result.metadata_found);
    assert!(result.error.is_none());
    assert!(result.directory("MakerNote").is_none());
    assert!(result.directory("MakerNoteDirectory").is_none());
    assert!(result
        .flat_tag_list
        .iter()
        .all(|e| e.tag != tags::CANON_PROCESSING_INFO));
}

#[test]
fn test_missing_make_yields_no_maker_note() {
    let mut builder = TiffBuilder::new();
    let base = builder.ifd().pointer(tags::EXIF_POINTER, 1);
    let base = builder.add_ifd(base);
    let exif = builder.ifd().pointer(tags::MAKER_NOTE, 2);
    builder.add_ifd(exif);
    let note = builder.ifd().long(tags::CANON_MODEL_ID, 1);
    builder.add_ifd(note);
    builder.chain(&[base]);

    let result = parse(builder.build());
    assert!(result.error.is_none());
    assert!(result.directory("MakerNote").is_none());
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_registered_decoder_handles_new_make() {
    let mut engine = Engine::new();
    engine.register_vendor(Box::new(GenericDecoder { make: "nikon" }));

    let data = camera_tiff(ByteOrder::LittleEndian, "Nikon", 1);
    let result = engine.parse(MemorySource::new(data, "nikon"), false);

    let note = result.directory("MakerNote").expect("maker note");
    assert_eq!(note.kind, DirectoryKind::Vendor("nikon"));
    assert_eq!(note.len(), 2);
    assert!(note.entries.iter().all(|e| e.name == Some("VendorTag")));

    // Vendor entries come last in the flat list
    let last = result.flat_tag_list.last().unwrap();
    assert_eq!(last.name, Some("VendorTag"));
}

#[test]
fn test_registered_decoder_replaces_builtin() {
    let mut engine = Engine::new();
    engine.register_vendor(Box::new(GenericDecoder { make: "canon" }));

    let data = camera_tiff(ByteOrder::LittleEndian, "Canon", 1);
    let result = engine.parse(MemorySource::new(data, "canon"), false);

    let note = result.directory("MakerNote").expect("maker note");
    let info = note.entry(tags::CANON_PROCESSING_INFO).unwrap();
    assert_eq!(info.name, Some("VendorTag"));
    assert!(info.display.starts_with("28,"));
}

#[test]
fn test_failing_decoder_drops_maker_note_only() {
    let mut engine = Engine::new();
    engine.register_vendor(Box::new(FailingDecoder));

    let data = camera_tiff(ByteOrder::LittleEndian, "Nikon", 1);
    let result = engine.parse(MemorySource::new(data, "nikon"), false);

    assert!(result.metadata_found);
    assert!(result.error.is_none());
    assert!(result.directory("MakerNote").is_none());
    assert!(result.directory("ExifDirectory").is_some());
    assert!(result.directory("GpsDirectory").is_some());
}
