//! # tiff-meta
//!
//! A TIFF tag-directory engine: parses and emits the tag-directory
//! structure of multi-page TIFF containers, resolves pixel layout from a
//! sparse set of integer tags, and produces rectangular tile descriptors
//! for an external streaming decoder.
//!
//! The engine decides *where* compressed bytes live and *how* decoded
//! samples map to channels; it never compresses or decompresses anything.
//! Pixel I/O, codecs, and format registration belong to the caller: the
//! boundary is [`is_tiff`] for signature sniffing, [`TiffReader`] for
//! opening, and [`save`] for writing.
//!
//! ## Architecture
//!
//! - [`io`] - endian primitives and checked stream reads
//! - [`tags`] - tag ids, field types, and the compression scheme table
//! - [`value`] - decoded values and the type-keyed decode dispatch
//! - [`directory`] - the per-page tag directory with load/save
//! - [`format`] - static open/save tables mapping tags to color modes
//! - [`layout`] - strip/tile placement and tile descriptors
//! - [`reader`] - container open and frame navigation
//! - [`writer`] - the single-strip save path
//!
//! ## Example
//!
//! ```rust
//! use std::io::Cursor;
//! use tiff_meta::{save, ColorMode, ImageInfo, TiffReader};
//!
//! # fn main() -> Result<(), tiff_meta::TiffError> {
//! let mut out = Cursor::new(Vec::new());
//! let tile = save(&mut out, &ImageInfo {
//!     width: 16,
//!     height: 16,
//!     mode: ColorMode::Rgb,
//!     description: None,
//!     palette: None,
//! })?;
//! // raw pixel rows belong at `tile.offset`; reopening resolves the
//! // same geometry and placement
//! let reader = TiffReader::open(Cursor::new(out.into_inner()))?;
//! assert_eq!(reader.size(), (16, 16));
//! assert_eq!(reader.mode(), ColorMode::Rgb);
//! assert_eq!(reader.frame().tiles[0].offset, tile.offset);
//! # Ok(())
//! # }
//! ```

pub mod directory;
pub mod error;
pub mod format;
pub mod io;
pub mod layout;
pub mod reader;
pub mod tags;
pub mod value;
pub mod writer;

// Re-export the public surface
pub use directory::TagDirectory;
pub use error::TiffError;
pub use format::{ColorMode, RawPalette, PALETTE_LAYOUT};
pub use io::ByteOrder;
pub use layout::{DecoderParams, Rect, TileDescriptor};
pub use reader::{is_tiff, Frame, TiffReader, SIGNATURES};
pub use tags::{Compression, FieldType, Tag};
pub use value::{Rational, Value};
pub use writer::{save, ImageInfo};
