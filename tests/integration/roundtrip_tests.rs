//! Save/reload round trips and read-path edge cases.

use std::io::Cursor;

use tiff_meta::{
    is_tiff, save, ByteOrder, ColorMode, ImageInfo, Tag, TiffError, TiffReader,
};

use super::test_utils::{build_container, gray_page, PageBuilder};

// =============================================================================
// Writable modes
// =============================================================================

const WRITABLE_MODES: [ColorMode; 12] = [
    ColorMode::Bilevel,
    ColorMode::Gray,
    ColorMode::Palette,
    ColorMode::Int32,
    ColorMode::Int16,
    ColorMode::Float32,
    ColorMode::Rgb,
    ColorMode::Rgbx,
    ColorMode::Rgba,
    ColorMode::Cmyk,
    ColorMode::YCbCr,
    ColorMode::Lab,
];

#[test]
fn test_every_writable_mode_round_trips() {
    let palette = vec![0u8; 768];
    for mode in WRITABLE_MODES {
        let mut out = Cursor::new(Vec::new());
        save(
            &mut out,
            &ImageInfo {
                width: 23,
                height: 17,
                mode,
                description: None,
                palette: Some(&palette),
            },
        )
        .unwrap_or_else(|e| panic!("saving mode {mode} failed: {e}"));

        let reader = TiffReader::open(Cursor::new(out.into_inner()))
            .unwrap_or_else(|e| panic!("reopening mode {mode} failed: {e}"));
        assert_eq!(reader.size(), (23, 17), "size mismatch for mode {mode}");
        assert_eq!(reader.mode(), mode, "mode mismatch for mode {mode}");
    }
}

#[test]
fn test_written_output_passes_sniff() {
    let mut out = Cursor::new(Vec::new());
    save(
        &mut out,
        &ImageInfo {
            width: 4,
            height: 4,
            mode: ColorMode::Gray,
            description: None,
            palette: None,
        },
    )
    .unwrap();
    let bytes = out.into_inner();
    assert!(is_tiff(&bytes));
}

#[test]
fn test_palette_table_survives_round_trip() {
    // every representable 8-bit channel value scales to 16 bits and back
    let palette: Vec<u8> = (0..768).map(|i| (i % 256) as u8).collect();
    let mut out = Cursor::new(Vec::new());
    save(
        &mut out,
        &ImageInfo {
            width: 8,
            height: 8,
            mode: ColorMode::Palette,
            description: None,
            palette: Some(&palette),
        },
    )
    .unwrap();

    let reader = TiffReader::open(Cursor::new(out.into_inner())).unwrap();
    let decoded = reader.frame().palette.as_ref().unwrap();
    assert_eq!(decoded.data, palette);
}

// =============================================================================
// Read path over handcrafted containers
// =============================================================================

#[test]
fn test_big_endian_container() {
    const BE: ByteOrder = ByteOrder::BigEndian;
    let bytes = build_container(BE, vec![gray_page(BE, 300, 200, 4096)]);

    let mut reader = TiffReader::open(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.byte_order(), BE);
    assert_eq!(reader.size(), (300, 200));
    assert_eq!(reader.mode(), ColorMode::Gray);
    assert_eq!(reader.frame().tiles[0].offset, 4096);
    assert_eq!(
        reader.directory().scalar(Tag::ImageWidth).unwrap(),
        Some(300)
    );
}

#[test]
fn test_unknown_field_type_does_not_break_open() {
    const LE: ByteOrder = ByteOrder::LittleEndian;
    let page = gray_page(LE, 6, 6, 512).raw(40000, 99, 1, &[0xAA, 0xBB, 0xCC, 0xDD]);
    let bytes = build_container(LE, vec![page]);

    let mut reader = TiffReader::open(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.size(), (6, 6));
    // present in raw form, unreachable through decode
    assert!(reader.directory().contains(40000u16));
    assert_eq!(reader.directory().get(40000u16), None);
    // neighbors are unaffected
    assert_eq!(
        reader.directory().scalar(Tag::ImageLength).unwrap(),
        Some(6)
    );
}

#[test]
fn test_strip_clipping_over_handcrafted_container() {
    const LE: ByteOrder = ByteOrder::LittleEndian;
    let page = PageBuilder::new()
        .shorts(LE, 256, &[100])
        .shorts(LE, 257, &[10])
        .shorts(LE, 258, &[8])
        .shorts(LE, 262, &[1])
        .ascii(270, "banded scan")
        .shorts(LE, 278, &[4])
        .longs(LE, 273, &[1000, 2000, 3000]);
    let bytes = build_container(LE, vec![page]);

    let mut reader = TiffReader::open(Cursor::new(bytes)).unwrap();
    let rows: Vec<(u32, u32)> = reader
        .frame()
        .tiles
        .iter()
        .map(|t| (t.rect.top, t.rect.bottom))
        .collect();
    assert_eq!(rows, vec![(0, 4), (4, 8), (8, 10)]);
    assert_eq!(
        reader
            .directory()
            .get(270u16)
            .and_then(|v| v.as_ascii()),
        Some("banded scan")
    );
}

#[test]
fn test_truncated_external_value_fails_open() {
    const LE: ByteOrder = ByteOrder::LittleEndian;
    // declares 64 ASCII bytes but supplies only 8; the blob sits at the end
    // of the stream, so the declared span runs off the file
    let page = gray_page(LE, 6, 6, 512).raw(270, 2, 64, b"too short");
    let bytes = build_container(LE, vec![page]);

    let err = TiffReader::open(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, TiffError::Truncated { needed: 64, .. }));
}

#[test]
fn test_missing_placement_fails_open() {
    const LE: ByteOrder = ByteOrder::LittleEndian;
    let page = PageBuilder::new()
        .shorts(LE, 256, &[6])
        .shorts(LE, 257, &[6])
        .shorts(LE, 258, &[8])
        .shorts(LE, 262, &[1]);
    let bytes = build_container(LE, vec![page]);

    let err = TiffReader::open(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, TiffError::UnsupportedOrganization));
}
