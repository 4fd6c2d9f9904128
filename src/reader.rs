//! Container reading and frame navigation.
//!
//! A container is a 8-byte header followed by a linked list of tag
//! directories, one per page. The reader walks that list, re-resolving the
//! frame state (format, tile descriptors) from scratch after every
//! directory load. Offsets of pages discovered so far are cached, so
//! seeking backward is a direct jump rather than a replay from page 0.

use std::io::{Read, Seek, SeekFrom};

use bytes::Bytes;
use tracing::debug;

use crate::directory::TagDirectory;
use crate::error::TiffError;
use crate::format::{self, ColorMode, RawPalette};
use crate::io::{read_exact_checked, ByteOrder};
use crate::layout::{self, TileDescriptor};
use crate::tags::Compression;

/// The two accepted container signatures: order marker plus magic 42.
pub const SIGNATURES: [[u8; 4]; 2] = [*b"II\x2A\x00", *b"MM\x00\x2A"];

/// Signature sniff for the external format registry.
pub fn is_tiff(prefix: &[u8]) -> bool {
    prefix.len() >= 4 && SIGNATURES.iter().any(|s| prefix[..4] == s[..])
}

// =============================================================================
// Frame
// =============================================================================

/// Everything one page resolves to: geometry, color layout, and the tile
/// descriptors the external decoder consumes.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Resolved color mode
    pub mode: ColorMode,

    /// Raw sample layout for the whole image
    pub layout: &'static str,

    /// Compression scheme of the pixel data
    pub compression: Compression,

    /// Rectangular pixel regions, in placement order
    pub tiles: Vec<TileDescriptor>,

    /// Shared prefix for every tile of an abbreviated-JPEG frame
    pub jpeg_tables: Option<Bytes>,

    /// 8-bit color table for palette-indexed frames
    pub palette: Option<RawPalette>,
}

fn build_frame(dir: &mut TagDirectory) -> Result<Frame, TiffError> {
    let fmt = format::resolve(dir)?;
    let (tiles, jpeg_tables) = layout::plan(dir, &fmt)?;
    Ok(Frame {
        width: fmt.width,
        height: fmt.height,
        mode: fmt.mode,
        layout: fmt.layout,
        compression: fmt.compression,
        tiles,
        jpeg_tables,
        palette: fmt.palette,
    })
}

// =============================================================================
// TiffReader
// =============================================================================

/// A multi-page container opened over a seekable stream.
///
/// Seeking mutates the shared frame state, so a reader must not be shared
/// across threads without external synchronization.
#[derive(Debug)]
pub struct TiffReader<R> {
    stream: R,
    byte_order: ByteOrder,
    /// Page offsets discovered so far; index = page number
    page_offsets: Vec<u32>,
    frame_index: usize,
    directory: TagDirectory,
    frame: Frame,
}

impl<R: Read + Seek> TiffReader<R> {
    /// Open a container and load its first page.
    ///
    /// Fails on a bad signature, a malformed directory, or a first page
    /// whose tags do not resolve to a supported layout.
    pub fn open(mut stream: R) -> Result<Self, TiffError> {
        let mut header = [0u8; 8];
        read_exact_checked(&mut stream, &mut header)?;
        if !is_tiff(&header) {
            let mut magic = [0u8; 4];
            magic.copy_from_slice(&header[..4]);
            return Err(TiffError::InvalidMagic(magic));
        }
        let byte_order = match ByteOrder::from_marker([header[0], header[1]]) {
            Some(order) => order,
            None => {
                let mut magic = [0u8; 4];
                magic.copy_from_slice(&header[..4]);
                return Err(TiffError::InvalidMagic(magic));
            }
        };

        let first_offset = byte_order.read_u32(&header[4..]);
        debug!(?byte_order, first_offset, "opening container");

        let mut directory = TagDirectory::new(byte_order);
        stream.seek(SeekFrom::Start(first_offset as u64))?;
        directory.load(&mut stream)?;
        let frame = build_frame(&mut directory)?;

        let mut page_offsets = vec![first_offset];
        if directory.next_offset() != 0 {
            page_offsets.push(directory.next_offset());
        }

        Ok(TiffReader {
            stream,
            byte_order,
            page_offsets,
            frame_index: 0,
            directory,
            frame,
        })
    }

    /// Byte order declared by the container header.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Current page index.
    pub fn tell(&self) -> usize {
        self.frame_index
    }

    /// (width, height) of the current frame.
    pub fn size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    /// Color mode of the current frame.
    pub fn mode(&self) -> ColorMode {
        self.frame.mode
    }

    /// The fully resolved current frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Tag directory of the current frame, for direct tag access.
    pub fn directory(&mut self) -> &mut TagDirectory {
        &mut self.directory
    }

    /// Give the underlying stream back.
    pub fn into_inner(self) -> R {
        self.stream
    }

    /// Select a page as the current frame.
    ///
    /// Already-visited pages are reloaded from their cached offset; seeking
    /// forward walks the remaining chain. Fails with
    /// [`TiffError::FrameOutOfRange`] past the last page; the reader then
    /// still holds the frame it had before the seek.
    pub fn seek(&mut self, frame: usize) -> Result<(), TiffError> {
        while self.page_offsets.len() <= frame {
            let frontier = self.page_offsets.len() - 1;
            self.load_page(frontier)?;
            if self.page_offsets.len() == frontier + 1 {
                // chain ended early; restore the directory of the frame
                // the reader still exposes
                self.load_page(self.frame_index)?;
                return Err(TiffError::FrameOutOfRange(frame));
            }
        }
        self.load_page(frame)?;
        self.frame = build_frame(&mut self.directory)?;
        self.frame_index = frame;
        debug!(frame, "selected frame");
        Ok(())
    }

    /// Load the directory at a cached page offset, extending the offset
    /// cache when the page at the frontier reveals its successor.
    fn load_page(&mut self, index: usize) -> Result<(), TiffError> {
        let offset = self.page_offsets[index];
        self.stream.seek(SeekFrom::Start(offset as u64))?;
        self.directory.load(&mut self.stream)?;
        if index + 1 == self.page_offsets.len() && self.directory.next_offset() != 0 {
            self.page_offsets.push(self.directory.next_offset());
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
