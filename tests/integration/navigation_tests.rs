//! Multi-page navigation tests.

use std::io::Cursor;

use tiff_meta::{ByteOrder, Tag, TiffError, TiffReader};

use super::test_utils::{build_container, gray_page};

const LE: ByteOrder = ByteOrder::LittleEndian;

fn three_pages() -> Vec<u8> {
    build_container(
        LE,
        vec![
            gray_page(LE, 10, 10, 111),
            gray_page(LE, 20, 20, 222),
            gray_page(LE, 30, 30, 333),
        ],
    )
}

#[test]
fn test_walk_forward() {
    let mut reader = TiffReader::open(Cursor::new(three_pages())).unwrap();
    assert_eq!(reader.tell(), 0);
    assert_eq!(reader.size(), (10, 10));

    reader.seek(1).unwrap();
    assert_eq!(reader.tell(), 1);
    assert_eq!(reader.size(), (20, 20));
    assert_eq!(reader.frame().tiles[0].offset, 222);

    reader.seek(2).unwrap();
    assert_eq!(reader.tell(), 2);
    assert_eq!(reader.size(), (30, 30));
}

#[test]
fn test_skip_ahead_without_intermediate_seeks() {
    let mut reader = TiffReader::open(Cursor::new(three_pages())).unwrap();
    reader.seek(2).unwrap();
    assert_eq!(reader.size(), (30, 30));
    assert_eq!(reader.frame().tiles[0].offset, 333);
}

#[test]
fn test_back_and_forth_yields_identical_frames() {
    let mut reader = TiffReader::open(Cursor::new(three_pages())).unwrap();

    reader.seek(2).unwrap();
    let last_tiles = reader.frame().tiles.clone();
    let last_size = reader.size();
    let last_mode = reader.mode();

    reader.seek(0).unwrap();
    let first_tiles = reader.frame().tiles.clone();
    assert_eq!(reader.size(), (10, 10));

    reader.seek(2).unwrap();
    assert_eq!(reader.frame().tiles, last_tiles);
    assert_eq!(reader.size(), last_size);
    assert_eq!(reader.mode(), last_mode);

    reader.seek(0).unwrap();
    assert_eq!(reader.frame().tiles, first_tiles);
}

#[test]
fn test_directory_follows_current_page() {
    let mut reader = TiffReader::open(Cursor::new(three_pages())).unwrap();
    reader.seek(1).unwrap();
    assert_eq!(
        reader.directory().scalar(Tag::ImageWidth).unwrap(),
        Some(20)
    );
    reader.seek(0).unwrap();
    assert_eq!(
        reader.directory().scalar(Tag::ImageWidth).unwrap(),
        Some(10)
    );
}

#[test]
fn test_seek_past_end() {
    let mut reader = TiffReader::open(Cursor::new(three_pages())).unwrap();
    assert!(matches!(
        reader.seek(3),
        Err(TiffError::FrameOutOfRange(3))
    ));
    // end-of-sequence is detectable and non-fatal
    assert_eq!(reader.tell(), 0);
    assert_eq!(reader.size(), (10, 10));
    reader.seek(2).unwrap();
    assert_eq!(reader.size(), (30, 30));
}
