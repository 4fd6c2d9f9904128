//! Tag and field type definitions.
//!
//! This module defines the vocabulary for directory parsing:
//! - Field types that determine how values are encoded
//! - Tag IDs that identify metadata fields
//! - The static compression scheme table
//!
//! Only the tags needed to resolve image geometry, color layout, and
//! strip/tile placement are named here. Directories still carry entries
//! for any other tag id; they are just accessed by number.

// =============================================================================
// Field types
// =============================================================================

/// Field types that determine how tag values are encoded.
///
/// Each type has a fixed element size, which drives both the inline/offset
/// storage decision and array decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer (1 byte)
    Byte = 1,

    /// 8-bit ASCII character, NUL-terminated as a whole value (1 byte)
    Ascii = 2,

    /// Unsigned 16-bit integer (2 bytes)
    Short = 3,

    /// Unsigned 32-bit integer (4 bytes)
    Long = 4,

    /// Pair of 32-bit integers: numerator, denominator (8 bytes)
    Rational = 5,

    /// Untyped byte data (1 byte per element)
    Undefined = 7,
}

impl FieldType {
    /// Size of a single element of this type in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::Byte => 1,
            FieldType::Ascii => 1,
            FieldType::Short => 2,
            FieldType::Long => 4,
            FieldType::Rational => 8,
            FieldType::Undefined => 1,
        }
    }

    /// Create a FieldType from its numeric code.
    ///
    /// Returns `None` for unsupported or unknown codes. Entries with an
    /// unknown field type stay in the directory in raw form but can never
    /// be decoded.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            7 => Some(FieldType::Undefined),
            _ => None,
        }
    }
}

// =============================================================================
// Tags
// =============================================================================

/// Tag ids the engine interprets.
///
/// Directories are keyed by raw `u16`; this enum names the subset the
/// engine reads or writes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Tag {
    /// Image width in pixels
    ImageWidth = 256,

    /// Image height in pixels
    ImageLength = 257,

    /// Bits per sample, one value per channel
    BitsPerSample = 258,

    /// Compression scheme code
    Compression = 259,

    /// How sample values map to color
    PhotometricInterpretation = 262,

    /// Free-text description
    ImageDescription = 270,

    /// Byte offsets of strips
    StripOffsets = 273,

    /// Number of components per pixel
    SamplesPerPixel = 277,

    /// Row count per strip
    RowsPerStrip = 278,

    /// Byte counts of strips
    StripByteCounts = 279,

    /// How components are organized (1 = chunky, 2 = separate planes)
    PlanarConfiguration = 284,

    /// Row-differencing predictor for LZW data
    Predictor = 317,

    /// Palette: three 16-bit channel planes
    ColorMap = 320,

    /// Tile width in pixels
    TileWidth = 322,

    /// Tile height in pixels
    TileLength = 323,

    /// Byte offsets of tiles
    TileOffsets = 324,

    /// Meaning of extra sample channels
    ExtraSamples = 338,

    /// Numeric interpretation of samples (1 = unsigned, 2 = signed, 3 = float)
    SampleFormat = 339,

    /// JPEG quantization/Huffman tables for abbreviated streams
    JpegTables = 347,
}

impl Tag {
    /// Get the numeric tag id.
    #[inline]
    pub const fn id(self) -> u16 {
        self as u16
    }
}

impl From<Tag> for u16 {
    fn from(tag: Tag) -> u16 {
        tag.id()
    }
}

// =============================================================================
// Compression schemes
// =============================================================================

/// Compression scheme identifiers.
///
/// The engine never decompresses anything itself, but every frame must name
/// its scheme so the external tile decoder can pick a codec. Unrecognized
/// codes fail the open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Compression {
    /// No compression
    Raw = 1,

    /// CCITT modified Huffman RLE
    CcittRle = 2,

    /// CCITT Group 3 fax
    Group3 = 3,

    /// CCITT Group 4 fax
    Group4 = 4,

    /// LZW
    Lzw = 5,

    /// "Old-style" JPEG, obsolete
    OldJpeg = 6,

    /// JPEG
    Jpeg = 7,

    /// Uncompressed with 16-bit padding
    Raw16 = 32771,

    /// PackBits run-length encoding
    Packbits = 32773,
}

impl Compression {
    /// Create a Compression from its numeric code.
    ///
    /// Returns `None` for codes outside the static table.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Compression::Raw),
            2 => Some(Compression::CcittRle),
            3 => Some(Compression::Group3),
            4 => Some(Compression::Group4),
            5 => Some(Compression::Lzw),
            6 => Some(Compression::OldJpeg),
            7 => Some(Compression::Jpeg),
            32771 => Some(Compression::Raw16),
            32773 => Some(Compression::Packbits),
            _ => None,
        }
    }

    /// Decoder name handed to the external tile decoder.
    pub const fn name(self) -> &'static str {
        match self {
            Compression::Raw => "raw",
            Compression::CcittRle => "tiff_ccitt",
            Compression::Group3 => "group3",
            Compression::Group4 => "group4",
            Compression::Lzw => "tiff_lzw",
            Compression::OldJpeg => "tiff_jpeg",
            Compression::Jpeg => "jpeg",
            Compression::Raw16 => "tiff_raw_16",
            Compression::Packbits => "packbits",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
