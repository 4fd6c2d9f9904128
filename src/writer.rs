//! The save entry point.
//!
//! Writing reverses the read flow: the caller supplies image attributes,
//! the save table picks the interpretive tags, the directory serializes
//! them, and the caller receives a single whole-image tile descriptor
//! telling the external raw-pixel writer where its bytes go. Only
//! single-strip little-endian output is produced.

use std::io::{Seek, Write};

use tracing::debug;

use crate::directory::TagDirectory;
use crate::error::TiffError;
use crate::format::{self, ColorMode};
use crate::io::ByteOrder;
use crate::layout::{DecoderParams, Rect, TileDescriptor};
use crate::tags::Tag;

/// Attributes of an image to be written.
#[derive(Debug, Clone)]
pub struct ImageInfo<'a> {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Color mode; must appear in the save table
    pub mode: ColorMode,

    /// Optional free-text description tag
    pub description: Option<&'a str>,

    /// 768-byte plane-ordered RGB color table, required for
    /// [`ColorMode::Palette`] and ignored otherwise
    pub palette: Option<&'a [u8]>,
}

/// Write the container header and one tag directory for `image`.
///
/// Returns the whole-image tile descriptor whose offset is where the
/// caller must append the raw pixel rows. Nothing is written when the mode
/// is rejected; an I/O failure mid-write leaves the stream partially
/// written.
pub fn save<W: Write + Seek>(
    out: &mut W,
    image: &ImageInfo<'_>,
) -> Result<TileDescriptor, TiffError> {
    let params = format::save_layout(image.mode)
        .ok_or(TiffError::UnsupportedWriteMode(image.mode.name()))?;

    // container header: order marker, magic, offset of the first directory
    const ORDER: ByteOrder = ByteOrder::LittleEndian;
    out.write_all(b"II")?;
    out.write_all(&ORDER.emit_u16(42))?;
    out.write_all(&ORDER.emit_u32(8))?;

    let mut dir = TagDirectory::new(ORDER);
    dir.set(Tag::ImageWidth, image.width);
    dir.set(Tag::ImageLength, image.height);
    if let Some(description) = image.description {
        dir.set(Tag::ImageDescription, description);
    }
    // the 1-bit single-sample default is left implicit
    if params.bits != [1u32].as_slice() {
        dir.set(Tag::BitsPerSample, params.bits);
        if params.bits.len() != 1 {
            dir.set(Tag::SamplesPerPixel, params.bits.len() as u32);
        }
    }
    if let Some(extra) = params.extra {
        dir.set(Tag::ExtraSamples, extra);
    }
    if params.sample_format != 1 {
        dir.set(Tag::SampleFormat, params.sample_format);
    }
    dir.set(Tag::PhotometricInterpretation, params.photometric);
    if image.mode == ColorMode::Palette {
        let palette = image.palette.ok_or(TiffError::MissingPalette)?;
        dir.set(Tag::ColorMap, format::colormap_from_palette(palette));
    }

    // a single strip covering the whole image
    let stride = params.bits.len() as u32 * ((image.width * params.bits[0] + 7) / 8);
    dir.set(Tag::RowsPerStrip, image.height);
    dir.set(Tag::StripByteCounts, stride * image.height);
    dir.set(Tag::StripOffsets, 0u32); // patched by the directory writer

    let offset = dir.save(out)?;
    debug!(
        width = image.width,
        height = image.height,
        mode = image.mode.name(),
        offset,
        "directory written"
    );

    Ok(TileDescriptor {
        codec: "raw",
        rect: Rect {
            left: 0,
            top: 0,
            right: image.width,
            bottom: image.height,
        },
        offset,
        params: Some(DecoderParams::Raw {
            layout: params.layout,
            stride,
            orientation: 1,
        }),
    })
}

// =============================================================================
// Tests
// =============================================================================
