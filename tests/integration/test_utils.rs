//! Test utilities for integration tests.
//!
//! Provides a small builder that synthesizes TIFF byte streams in memory,
//! with control over byte order, page count, and raw directory entries --
//! including entries the engine itself would never write, like unknown
//! field types.

use tiff_meta::ByteOrder;

// =============================================================================
// Page builder
// =============================================================================

struct RawEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    data: Vec<u8>,
}

/// One directory's worth of raw entries.
#[derive(Default)]
pub struct PageBuilder {
    entries: Vec<RawEntry>,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a SHORT entry.
    pub fn shorts(mut self, order: ByteOrder, tag: u16, values: &[u16]) -> Self {
        let data = values.iter().flat_map(|&v| order.emit_u16(v)).collect();
        self.entries.push(RawEntry {
            tag,
            field_type: 3,
            count: values.len() as u32,
            data,
        });
        self
    }

    /// Add a LONG entry.
    pub fn longs(mut self, order: ByteOrder, tag: u16, values: &[u32]) -> Self {
        let data = values.iter().flat_map(|&v| order.emit_u32(v)).collect();
        self.entries.push(RawEntry {
            tag,
            field_type: 4,
            count: values.len() as u32,
            data,
        });
        self
    }

    /// Add an ASCII entry with its NUL terminator.
    pub fn ascii(mut self, tag: u16, text: &str) -> Self {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        self.entries.push(RawEntry {
            tag,
            field_type: 2,
            count: data.len() as u32,
            data,
        });
        self
    }

    /// Add an entry with an arbitrary field type and pre-encoded payload.
    pub fn raw(mut self, tag: u16, field_type: u16, count: u32, data: &[u8]) -> Self {
        self.entries.push(RawEntry {
            tag,
            field_type,
            count,
            data: data.to_vec(),
        });
        self
    }
}

/// A grayscale page: 8-bit samples, one strip at an arbitrary offset.
pub fn gray_page(order: ByteOrder, width: u16, height: u16, strip_offset: u32) -> PageBuilder {
    PageBuilder::new()
        .shorts(order, 256, &[width])
        .shorts(order, 257, &[height])
        .shorts(order, 258, &[8])
        .shorts(order, 262, &[1])
        .longs(order, 273, &[strip_offset])
}

// =============================================================================
// Container builder
// =============================================================================

/// Assemble a full container: header, then each page's directory followed
/// by its external value blobs, chained through next-directory offsets.
pub fn build_container(order: ByteOrder, pages: Vec<PageBuilder>) -> Vec<u8> {
    let marker: &[u8; 2] = match order {
        ByteOrder::LittleEndian => b"II",
        ByteOrder::BigEndian => b"MM",
    };

    let mut out = Vec::new();
    out.extend_from_slice(marker);
    out.extend_from_slice(&order.emit_u16(42));
    out.extend_from_slice(&order.emit_u32(8));

    let page_count = pages.len();
    for (index, mut page) in pages.into_iter().enumerate() {
        page.entries.sort_by_key(|e| e.tag);

        let page_base = out.len() as u32;
        let table_size = 2 + 12 * page.entries.len() as u32 + 4;
        let external_start = page_base + table_size;

        // lay out the external region first so entry values can point at it
        let mut external = Vec::new();
        let mut placed: Vec<[u8; 4]> = Vec::new();
        for entry in &page.entries {
            if entry.data.len() <= 4 {
                let mut value = [0u8; 4];
                value[..entry.data.len()].copy_from_slice(&entry.data);
                placed.push(value);
            } else {
                let at = external_start + external.len() as u32;
                placed.push(order.emit_u32(at));
                external.extend_from_slice(&entry.data);
                if external.len() & 1 != 0 {
                    external.push(0);
                }
            }
        }

        let next_offset = if index + 1 == page_count {
            0
        } else {
            external_start + external.len() as u32
        };

        out.extend_from_slice(&order.emit_u16(page.entries.len() as u16));
        for (entry, value) in page.entries.iter().zip(&placed) {
            out.extend_from_slice(&order.emit_u16(entry.tag));
            out.extend_from_slice(&order.emit_u16(entry.field_type));
            out.extend_from_slice(&order.emit_u32(entry.count));
            out.extend_from_slice(value);
        }
        out.extend_from_slice(&order.emit_u32(next_offset));
        out.extend_from_slice(&external);
    }

    out
}
