//! Color-mode resolution.
//!
//! Two independent static tables map between interpretive tags and
//! (color mode, raw sample layout) pairs: the open table keys on
//! (photometric, sample format, bits per sample, extra samples), and the
//! save table keys on the color mode alone. Not every readable layout is
//! writable, and the palette conversion is lossy in the read direction,
//! so neither table is derived from the other.

use std::fmt;

use tracing::debug;

use crate::directory::TagDirectory;
use crate::error::TiffError;
use crate::tags::{Compression, Tag};

// =============================================================================
// ColorMode
// =============================================================================

/// Color modes the engine can resolve or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// 1-bit bilevel
    Bilevel,
    /// 8-bit grayscale
    Gray,
    /// 8-bit palette-indexed
    Palette,
    /// 8-bit-per-channel RGB
    Rgb,
    /// RGB with a padding channel
    Rgbx,
    /// RGB with an alpha channel
    Rgba,
    /// 8-bit-per-channel CMYK
    Cmyk,
    /// 8-bit-per-channel YCbCr
    YCbCr,
    /// 8-bit-per-channel CIE L*a*b*
    Lab,
    /// 16-bit unsigned integer samples
    Int16,
    /// 32-bit signed integer samples
    Int32,
    /// 32-bit floating point samples
    Float32,
}

impl ColorMode {
    /// Short mode name used at the decoder boundary.
    pub const fn name(self) -> &'static str {
        match self {
            ColorMode::Bilevel => "1",
            ColorMode::Gray => "L",
            ColorMode::Palette => "P",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgbx => "RGBX",
            ColorMode::Rgba => "RGBA",
            ColorMode::Cmyk => "CMYK",
            ColorMode::YCbCr => "YCbCr",
            ColorMode::Lab => "LAB",
            ColorMode::Int16 => "I;16",
            ColorMode::Int32 => "I",
            ColorMode::Float32 => "F",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Open table
// =============================================================================

struct OpenEntry {
    photometric: u32,
    sample_format: u32,
    bits: &'static [u32],
    extra: &'static [u32],
    mode: ColorMode,
    layout: &'static str,
}

macro_rules! open_entry {
    ($photo:expr, $fmt:expr, $bits:expr, $extra:expr => $mode:expr, $layout:expr) => {
        OpenEntry {
            photometric: $photo,
            sample_format: $fmt,
            bits: &$bits,
            extra: &$extra,
            mode: $mode,
            layout: $layout,
        }
    };
}

/// (photometric, sample format, bits, extra samples) -> (mode, raw layout).
static OPEN_TABLE: &[OpenEntry] = &[
    open_entry!(0, 1, [1], [] => ColorMode::Bilevel, "1;I"),
    open_entry!(0, 1, [8], [] => ColorMode::Gray, "L;I"),
    open_entry!(1, 1, [1], [] => ColorMode::Bilevel, "1"),
    open_entry!(1, 1, [8], [] => ColorMode::Gray, "L"),
    open_entry!(1, 2, [16], [] => ColorMode::Int16, "I;16"),
    open_entry!(1, 2, [32], [] => ColorMode::Int32, "I;32S"),
    open_entry!(1, 3, [32], [] => ColorMode::Float32, "F;32F"),
    open_entry!(2, 1, [8, 8, 8], [] => ColorMode::Rgb, "RGB"),
    open_entry!(2, 1, [8, 8, 8, 8], [0] => ColorMode::Rgbx, "RGBX"),
    open_entry!(2, 1, [8, 8, 8, 8], [2] => ColorMode::Rgba, "RGBA"),
    open_entry!(3, 1, [1], [] => ColorMode::Palette, "P;1"),
    open_entry!(3, 1, [2], [] => ColorMode::Palette, "P;2"),
    open_entry!(3, 1, [4], [] => ColorMode::Palette, "P;4"),
    open_entry!(3, 1, [8], [] => ColorMode::Palette, "P"),
    open_entry!(5, 1, [8, 8, 8, 8], [] => ColorMode::Cmyk, "CMYK"),
    open_entry!(6, 1, [8, 8, 8], [] => ColorMode::YCbCr, "YCbCr"),
    open_entry!(8, 1, [8, 8, 8], [] => ColorMode::Lab, "LAB"),
];

/// Look up the open table.
pub(crate) fn resolve_layout(
    photometric: u32,
    sample_format: u32,
    bits: &[u32],
    extra: &[u32],
) -> Option<(ColorMode, &'static str)> {
    OPEN_TABLE
        .iter()
        .find(|e| {
            e.photometric == photometric
                && e.sample_format == sample_format
                && e.bits == bits
                && e.extra == extra
        })
        .map(|e| (e.mode, e.layout))
}

// =============================================================================
// Save table
// =============================================================================

/// Tag values a writable color mode maps onto.
pub(crate) struct SaveLayout {
    pub layout: &'static str,
    pub photometric: u32,
    pub sample_format: u32,
    pub bits: &'static [u32],
    pub extra: Option<u32>,
}

macro_rules! save_entry {
    ($mode:expr => $layout:expr, $photo:expr, $fmt:expr, $bits:expr, $extra:expr) => {
        (
            $mode,
            SaveLayout {
                layout: $layout,
                photometric: $photo,
                sample_format: $fmt,
                bits: &$bits,
                extra: $extra,
            },
        )
    };
}

/// mode -> (raw layout, photometric, sample format, bits, extra samples).
static SAVE_TABLE: &[(ColorMode, SaveLayout)] = &[
    save_entry!(ColorMode::Bilevel => "1", 1, 1, [1], None),
    save_entry!(ColorMode::Gray => "L", 1, 1, [8], None),
    save_entry!(ColorMode::Palette => "P", 3, 1, [8], None),
    save_entry!(ColorMode::Int32 => "I;32S", 1, 2, [32], None),
    save_entry!(ColorMode::Int16 => "I;16", 1, 2, [16], None),
    save_entry!(ColorMode::Float32 => "F;32F", 1, 3, [32], None),
    save_entry!(ColorMode::Rgb => "RGB", 2, 1, [8, 8, 8], None),
    save_entry!(ColorMode::Rgbx => "RGBX", 2, 1, [8, 8, 8, 8], Some(0)),
    save_entry!(ColorMode::Rgba => "RGBA", 2, 1, [8, 8, 8, 8], Some(2)),
    save_entry!(ColorMode::Cmyk => "CMYK", 5, 1, [8, 8, 8, 8], None),
    save_entry!(ColorMode::YCbCr => "YCbCr", 6, 1, [8, 8, 8], None),
    save_entry!(ColorMode::Lab => "LAB", 8, 1, [8, 8, 8], None),
];

/// Look up the save table.
pub(crate) fn save_layout(mode: ColorMode) -> Option<&'static SaveLayout> {
    SAVE_TABLE
        .iter()
        .find(|(m, _)| *m == mode)
        .map(|(_, layout)| layout)
}

// =============================================================================
// Palette conversion
// =============================================================================

/// Raw layout name of the decoded palette: three 256-byte channel planes.
pub const PALETTE_LAYOUT: &str = "RGB;L";

/// An 8-bit RGB color table in plane order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPalette {
    /// Raw layout name for the external codec ([`PALETTE_LAYOUT`])
    pub layout: &'static str,
    /// 768 bytes: the red plane, then green, then blue
    pub data: Vec<u8>,
}

/// Truncate 16-bit palette channel values to their high 8 bits.
///
/// This is lossy and one-directional; the low byte is discarded.
pub(crate) fn palette_from_colormap(values: &[u32]) -> Vec<u8> {
    values.iter().map(|&v| (v / 256) as u8).collect()
}

/// Scale 8-bit palette channel values up to the full 16-bit range.
pub(crate) fn colormap_from_palette(palette: &[u8]) -> Vec<u32> {
    palette.iter().map(|&v| v as u32 * 256).collect()
}

// =============================================================================
// Frame format resolution
// =============================================================================

/// Everything the interpretive tags of one directory resolve to.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedFormat {
    pub width: u32,
    pub height: u32,
    pub compression: Compression,
    pub planar: u32,
    pub mode: ColorMode,
    pub layout: &'static str,
    pub palette: Option<RawPalette>,
}

fn integers(dir: &mut TagDirectory, tag: Tag) -> Result<Option<Vec<u32>>, TiffError> {
    match dir.get(tag) {
        None => Ok(None),
        Some(value) => value.as_u32s().map(Some).ok_or(TiffError::InvalidTagValue {
            tag: tag.id(),
            message: "expected an integer sequence".into(),
        }),
    }
}

/// Resolve compression, geometry, and color layout from a loaded directory.
pub(crate) fn resolve(dir: &mut TagDirectory) -> Result<ResolvedFormat, TiffError> {
    let code = dir.scalar_or(Tag::Compression, 1)?;
    let compression =
        Compression::from_u32(code).ok_or(TiffError::UnsupportedCompression(code))?;
    let planar = dir.scalar_or(Tag::PlanarConfiguration, 1)?;
    let photometric =
        dir.require_scalar(Tag::PhotometricInterpretation, "PhotometricInterpretation")?;

    let width = dir.require_scalar(Tag::ImageWidth, "ImageWidth")?;
    let height = dir.require_scalar(Tag::ImageLength, "ImageLength")?;

    let sample_format = dir.scalar_or(Tag::SampleFormat, 1)?;
    let bits = integers(dir, Tag::BitsPerSample)?.unwrap_or_else(|| vec![1]);
    let extra = integers(dir, Tag::ExtraSamples)?.unwrap_or_default();

    let (mode, layout) = resolve_layout(photometric, sample_format, &bits, &extra).ok_or(
        TiffError::UnsupportedLayout {
            photometric,
            sample_format,
            bits: bits.clone(),
            extra: extra.clone(),
        },
    )?;

    debug!(
        compression = compression.name(),
        photometric,
        planar,
        width,
        height,
        mode = mode.name(),
        layout,
        "resolved frame format"
    );

    let palette = if mode == ColorMode::Palette {
        let colormap =
            integers(dir, Tag::ColorMap)?.ok_or(TiffError::MissingTag("ColorMap"))?;
        Some(RawPalette {
            layout: PALETTE_LAYOUT,
            data: palette_from_colormap(&colormap),
        })
    } else {
        None
    };

    Ok(ResolvedFormat {
        width,
        height,
        compression,
        planar,
        mode,
        layout,
        palette,
    })
}

// =============================================================================
// Tests
// =============================================================================
