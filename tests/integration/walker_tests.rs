//! Directory walking tests.
//!
//! Tests verify:
//! - Both byte orders decode to the same values
//! - Inline values are never fetched; external values are read relative to the header base
//! - Chains terminate, cycles are cut, children are captured once

use exif_engine::{ByteOrder, Container, DirectoryKind, Engine, MemorySource, ParseResult};

use super::test_utils::{camera_tiff, exif_jpeg, tags, TiffBuilder, TrackingSource};

fn parse(data: Vec<u8>) -> ParseResult {
    Engine::new().parse(MemorySource::new(data, "test"), false)
}

fn directory_names(result: &ParseResult) -> Vec<&str> {
    result.directories.iter().map(|d| d.name.as_str()).collect()
}

// =============================================================================
// Byte Order
// =============================================================================

#[test]
fn test_byte_order_integer_round_trip() {
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        for value in [0u32, 1, 0x1234, 0xDEAD_BEEF, u32::MAX] {
            assert_eq!(order.read_u32(&order.encode_u32(value)), value);
        }
        for value in [0u16, 1, 0x0102, u16::MAX] {
            assert_eq!(order.read_u16(&order.encode_u16(value)), value);
        }
    }
}

#[test]
fn test_both_byte_orders_decode_identically() {
    let little = parse(camera_tiff(ByteOrder::LittleEndian, "Canon", 6));
    let big = parse(camera_tiff(ByteOrder::BigEndian, "Canon", 6));

    assert_eq!(little.byte_order, Some(ByteOrder::LittleEndian));
    assert_eq!(big.byte_order, Some(ByteOrder::BigEndian));

    let render = |r: &ParseResult| -> Vec<(u16, String)> {
        r.directories
            .iter()
            .flat_map(|d| d.entries.iter().map(|e| (e.tag, e.display.clone())))
            .collect()
    };
    assert_eq!(render(&little), render(&big));
    assert!(!render(&little).is_empty());
}

// =============================================================================
// Value Resolution
// =============================================================================

#[test]
fn test_inline_values_never_seek() {
    let mut builder = TiffBuilder::new();
    let ifd = builder
        .ifd()
        .short(tags::ORIENTATION, 6)
        .long(tags::IMAGE_WIDTH, 640);
    let base = builder.add_ifd(ifd);
    builder.chain(&[base]);

    let source = TrackingSource::new(builder.build(), "inline.tif");
    let log = source.clone();
    let result = Engine::new().parse(source, false);

    assert_eq!(result.directories[0].len(), 2);
    // Signature, header, entry count, directory body; nothing else
    assert_eq!(log.requests().len(), 4);
}

#[test]
fn test_external_value_read_relative_to_header_base() {
    let mut builder = TiffBuilder::new();
    let ifd = builder
        .ifd()
        .ascii(tags::MODEL, "A Rather Long Model Name")
        .short(tags::ORIENTATION, 1);
    let base = builder.add_ifd(ifd);
    builder.chain(&[base]);
    let tiff = builder.build();

    // Model payload follows the single directory
    let model_offset = 8 + 2 + 2 * 12 + 4;
    let model_len = "A Rather Long Model Name".len() as u64 + 1;

    let source = TrackingSource::new(exif_jpeg(&tiff, false), "model.jpg");
    let log = source.clone();
    let result = Engine::new().parse(source, false);

    assert_eq!(result.container, Some(Container::Jpeg));
    let model = result.directories[0].entry(tags::MODEL).unwrap();
    assert!(model.is_external);
    assert_eq!(model.display, "A Rather Long Model Name");

    // Header base is 12 inside the JPEG
    assert!(log.touched(12 + model_offset, model_len));
    assert!(log.requests().contains(&(12 + model_offset, model_len as usize)));
}

#[test]
fn test_external_value_past_end_is_dropped() {
    let mut builder = TiffBuilder::new();
    let ifd = builder
        .ifd()
        .ascii(tags::MODEL, "Truncated model string")
        .short(tags::ORIENTATION, 3);
    let base = builder.add_ifd(ifd);
    builder.chain(&[base]);

    let mut tiff = builder.build();
    tiff.truncate(8 + 2 + 24 + 4 + 5);

    let result = parse(tiff);
    assert!(result.metadata_found);
    let base = &result.directories[0];
    assert!(!base.contains(tags::MODEL));
    assert_eq!(base.entry(tags::ORIENTATION).unwrap().display, "Rotate 180");
}

// =============================================================================
// Directory Chains
// =============================================================================

#[test]
fn test_chain_visits_each_directory_once() {
    let mut builder = TiffBuilder::new();
    let ifds: Vec<usize> = (0..3)
        .map(|i| {
            let ifd = builder.ifd().long(tags::IMAGE_WIDTH, 100 * (i + 1));
            builder.add_ifd(ifd)
        })
        .collect();
    builder.chain(&ifds);

    let result = parse(builder.build());
    assert_eq!(
        directory_names(&result),
        vec!["Directory0", "Directory1", "Directory2"]
    );
    assert_eq!(result.directories[2].entries[0].display, "300");
}

#[test]
fn test_cycle_in_chain_terminates() {
    let mut builder = TiffBuilder::new();
    let first = builder.ifd().short(tags::ORIENTATION, 1);
    let first = builder.add_ifd(first);
    // Second directory links back to the first
    let second = builder.ifd().short(tags::ORIENTATION, 3).next(8);
    let second = builder.add_ifd(second);
    builder.chain(&[first, second]);

    let result = parse(builder.build());
    assert_eq!(directory_names(&result), vec!["Directory0", "Directory1"]);
}

#[test]
fn test_dangling_next_offset_truncates_chain() {
    let mut builder = TiffBuilder::new();
    let ifd = builder.ifd().short(tags::ORIENTATION, 1).next(0x0010_0000);
    let base = builder.add_ifd(ifd);
    builder.chain(&[base]);

    let result = parse(builder.build());
    assert!(result.metadata_found);
    assert_eq!(directory_names(&result), vec!["Directory0"]);
}

// =============================================================================
// Special Children
// =============================================================================

#[test]
fn test_exif_and_gps_children() {
    let result = parse(camera_tiff(ByteOrder::LittleEndian, "Nikon", 1));

    let names = directory_names(&result);
    assert_eq!(names.iter().filter(|n| **n == "ExifDirectory").count(), 1);
    assert_eq!(names.iter().filter(|n| **n == "GpsDirectory").count(), 1);

    let base = result.directory("Directory0").unwrap();
    assert!(!base.contains(tags::EXIF_POINTER));
    assert!(!base.contains(tags::GPS_POINTER));

    let exif = result.directory("ExifDirectory").unwrap();
    assert_eq!(exif.kind, DirectoryKind::Exif);
    assert!(!exif.contains(tags::MAKER_NOTE));
}

#[test]
fn test_child_pointing_at_base_is_skipped() {
    let mut builder = TiffBuilder::new();
    let ifd = builder
        .ifd()
        .short(tags::ORIENTATION, 1)
        .pointer(tags::EXIF_POINTER, 0);
    let base = builder.add_ifd(ifd);
    builder.chain(&[base]);

    let result = parse(builder.build());
    assert_eq!(directory_names(&result), vec!["Directory0"]);
}

#[test]
fn test_gps_pointer_in_gps_directory_ignored() {
    let mut builder = TiffBuilder::new();
    let base = builder.ifd().pointer(tags::GPS_POINTER, 1);
    let base = builder.add_ifd(base);
    // 0x8825 is not a pointer inside a GPS directory, and not a GPS tag either
    let gps = builder
        .ifd()
        .ascii(tags::GPS_LATITUDE_REF, "S")
        .pointer(tags::GPS_POINTER, 2);
    builder.add_ifd(gps);
    let stray = builder.ifd().short(tags::ORIENTATION, 1);
    builder.add_ifd(stray);
    builder.chain(&[base]);

    let result = parse(builder.build());
    assert_eq!(directory_names(&result), vec!["Directory0", "GpsDirectory"]);
    let gps = result.directory("GpsDirectory").unwrap();
    assert_eq!(gps.len(), 1);
    assert_eq!(gps.entries[0].display, "South");
}

// =============================================================================
// Containers
// =============================================================================

#[test]
fn test_jpeg_with_app0_and_big_endian_block() {
    let tiff = camera_tiff(ByteOrder::BigEndian, "Canon", 8);
    let result = parse(exif_jpeg(&tiff, true));

    assert!(result.metadata_found);
    assert_eq!(result.container, Some(Container::Jpeg));
    assert_eq!(result.byte_order, Some(ByteOrder::BigEndian));

    let base = result.directory("Directory0").unwrap();
    // APP0 (18) + SOI (2) + APP1 prefix (10)
    assert_eq!(base.offset, 30 + 8);
    assert_eq!(base.entry(tags::ORIENTATION).unwrap().display, "Rotate 270 CW");
}
