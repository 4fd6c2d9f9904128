use thiserror::Error;

/// Errors produced while reading or writing TIFF tag directories.
#[derive(Debug, Error)]
pub enum TiffError {
    /// I/O error from the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File does not start with a TIFF signature (II/MM marker plus magic 42)
    #[error("invalid TIFF signature: {0:02X?}")]
    InvalidMagic([u8; 4]),

    /// A declared value span extends past the end of the stream
    #[error("truncated data: needed {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    /// Required tag is missing from the directory
    #[error("missing required tag: {0}")]
    MissingTag(&'static str),

    /// Tag is present but its value has the wrong shape for the request
    #[error("invalid value for tag {tag}: {message}")]
    InvalidTagValue { tag: u16, message: String },

    /// Compression code is not in the static scheme table
    #[error("unsupported compression code: {0}")]
    UnsupportedCompression(u32),

    /// No entry in the open table matches the interpretive tags
    #[error(
        "unsupported pixel layout: photometric {photometric}, \
         sample format {sample_format}, bits {bits:?}, extra samples {extra:?}"
    )]
    UnsupportedLayout {
        photometric: u32,
        sample_format: u32,
        bits: Vec<u32>,
        extra: Vec<u32>,
    },

    /// Neither strip nor tile placement tags are present
    #[error("unsupported data organization: no strip or tile offsets")]
    UnsupportedOrganization,

    /// Color mode is absent from the save table
    #[error("cannot write mode {0} as TIFF")]
    UnsupportedWriteMode(&'static str),

    /// Palette-indexed image was submitted for writing without a palette
    #[error("palette mode image has no palette")]
    MissingPalette,

    /// Write path only supports single-strip images
    #[error("multistrip output is not supported")]
    MultiStrip,

    /// Seek target is beyond the last page of the container
    #[error("frame {0} is past the end of the page chain")]
    FrameOutOfRange(usize),
}
