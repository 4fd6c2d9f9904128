//! Tile descriptors and strip/tile placement.
//!
//! A loaded directory organizes its pixel data either as strips (full-width
//! horizontal bands) or as a row-major grid of fixed-size tiles, chosen by
//! which placement tag is present. Both reduce to a flat list of rectangular
//! regions bound to file offsets; the external tile decoder consumes that
//! list and never sees the tags.

use bytes::Bytes;

use crate::directory::TagDirectory;
use crate::error::TiffError;
use crate::format::ResolvedFormat;
use crate::tags::{Compression, Tag};
use crate::value::Value;

// =============================================================================
// Descriptors
// =============================================================================

/// A rectangle in image coordinates: `[left, right) x [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// Decoder-specific configuration attached to a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderParams {
    /// Uncompressed data: raw sample layout, row stride (0 = derive from
    /// the rectangle), and row orientation
    Raw {
        layout: &'static str,
        stride: u32,
        orientation: i8,
    },

    /// Compressed data: raw sample layout of the decompressed samples,
    /// plus the row-differencing predictor id when one applies
    Compressed {
        layout: &'static str,
        predictor: Option<u32>,
    },
}

/// One rectangular region of pixel data for the external tile decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileDescriptor {
    /// Decoder name from the compression scheme table
    pub codec: &'static str,

    /// Region covered, in image coordinates
    pub rect: Rect,

    /// Absolute file offset of the compressed or raw bytes
    pub offset: u64,

    /// Decoder configuration; `None` for schemes the engine names but does
    /// not parameterize
    pub params: Option<DecoderParams>,
}

// =============================================================================
// Planning
// =============================================================================

/// Per-layer channel layouts for planar-separate RGB data.
const PLANE_LAYOUTS: [&str; 3] = ["R", "G", "B"];

fn decoder_params(
    dir: &mut TagDirectory,
    fmt: &ResolvedFormat,
    layer: usize,
) -> Option<DecoderParams> {
    let mut layout = fmt.layout;
    if fmt.layout == "RGB" && fmt.planar == 2 {
        layout = PLANE_LAYOUTS[layer.min(2)];
    }
    match fmt.compression {
        Compression::Raw => Some(DecoderParams::Raw {
            layout,
            stride: 0,
            orientation: 1,
        }),
        Compression::Packbits | Compression::Jpeg => Some(DecoderParams::Compressed {
            layout,
            predictor: None,
        }),
        Compression::Lzw => {
            let predictor = dir
                .get(Tag::Predictor)
                .and_then(Value::as_u32s)
                .and_then(|v| v.first().copied());
            Some(DecoderParams::Compressed { layout, predictor })
        }
        _ => None,
    }
}

fn placement_offsets(dir: &mut TagDirectory, tag: Tag) -> Result<Vec<u32>, TiffError> {
    dir.get(tag)
        .and_then(Value::as_u32s)
        .ok_or(TiffError::InvalidTagValue {
            tag: tag.id(),
            message: "expected integer offsets".into(),
        })
}

/// Convert placement tags into tile descriptors, plus the shared JPEG
/// tables prefix when the frame carries abbreviated JPEG streams.
///
/// Strips stack top to bottom at full image width, each `RowsPerStrip`
/// tall except the last, which is clipped to the image height. Tiles walk
/// a row-major grid and are not clipped when the image size is not a
/// multiple of the tile size. In both cases, offsets past one full image
/// cover the next sample plane of planar-separate data.
pub(crate) fn plan(
    dir: &mut TagDirectory,
    fmt: &ResolvedFormat,
) -> Result<(Vec<TileDescriptor>, Option<Bytes>), TiffError> {
    let jpeg_tables = if fmt.compression == Compression::Jpeg {
        match dir.get(Tag::JpegTables) {
            Some(Value::Undefined(data)) => Some(data.clone()),
            Some(Value::Bytes(data)) => Some(Bytes::copy_from_slice(data)),
            _ => None,
        }
    } else {
        None
    };

    let codec = fmt.compression.name();
    let mut tiles = Vec::new();

    if dir.contains(Tag::StripOffsets) {
        let rows = dir.scalar_or(Tag::RowsPerStrip, fmt.height)?;
        let mut y = 0u32;
        let mut layer = 0usize;
        let mut params = decoder_params(dir, fmt, layer);
        for offset in placement_offsets(dir, Tag::StripOffsets)? {
            tiles.push(TileDescriptor {
                codec,
                rect: Rect {
                    left: 0,
                    top: y.min(fmt.height),
                    right: fmt.width,
                    bottom: y.saturating_add(rows).min(fmt.height),
                },
                offset: offset as u64,
                params: params.clone(),
            });
            y = y.saturating_add(rows);
            if y >= fmt.height {
                y = 0;
                layer += 1;
                params = decoder_params(dir, fmt, layer);
            }
        }
    } else if dir.contains(Tag::TileOffsets) {
        let tile_width = dir.require_scalar(Tag::TileWidth, "TileWidth")?;
        let tile_height = dir.require_scalar(Tag::TileLength, "TileLength")?;
        let (mut x, mut y) = (0u32, 0u32);
        let mut layer = 0usize;
        let mut params = decoder_params(dir, fmt, layer);
        for offset in placement_offsets(dir, Tag::TileOffsets)? {
            tiles.push(TileDescriptor {
                codec,
                rect: Rect {
                    left: x,
                    top: y,
                    right: x.saturating_add(tile_width),
                    bottom: y.saturating_add(tile_height),
                },
                offset: offset as u64,
                params: params.clone(),
            });
            x = x.saturating_add(tile_width);
            if x >= fmt.width {
                x = 0;
                y = y.saturating_add(tile_height);
                if y >= fmt.height {
                    y = 0;
                    layer += 1;
                    params = decoder_params(dir, fmt, layer);
                }
            }
        }
    } else {
        return Err(TiffError::UnsupportedOrganization);
    }

    Ok((tiles, jpeg_tables))
}

// =============================================================================
// Tests
// =============================================================================
