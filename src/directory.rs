//! The tag directory: one per page of a multi-page container.
//!
//! A directory maps numeric tag ids to values. Values are kept in raw
//! `(field type, bytes)` form at load time and only decoded when first
//! accessed; the decoded form then replaces the raw one. Serialization
//! walks the map in ascending tag order, as the on-disk format requires.
//!
//! # On-disk layout
//!
//! ```text
//! 2 bytes   entry count N
//! N * 12    entries: 2-byte tag, 2-byte type, 4-byte count,
//!           4-byte inline value or offset to external storage
//! 4 bytes   offset of the next directory (0 = last page)
//! ...       external value blobs, word-aligned
//! ```

use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom, Write};

use bytes::Bytes;
use tracing::trace;

use crate::error::TiffError;
use crate::io::{read_exact_checked, ByteOrder};
use crate::tags::{FieldType, Tag};
use crate::value::{decode, Value};

/// Inline values occupy the 4-byte value field; anything longer lives at an
/// offset elsewhere in the stream.
const INLINE_LIMIT: u64 = 4;

/// Size of one directory entry on disk.
const ENTRY_SIZE: usize = 12;

// =============================================================================
// TagDirectory
// =============================================================================

/// One tag slot: raw bytes straight from the stream, or the decoded value
/// that replaced them on first access.
#[derive(Debug, Clone)]
enum Slot {
    Raw { field_type: u16, data: Bytes },
    Decoded(Value),
}

/// An ordered tag-id-to-value mapping for one page.
#[derive(Debug, Clone)]
pub struct TagDirectory {
    byte_order: ByteOrder,
    slots: BTreeMap<u16, Slot>,
    next: u32,
}

impl TagDirectory {
    /// Create an empty directory for the given byte order.
    pub fn new(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            slots: BTreeMap::new(),
            next: 0,
        }
    }

    /// Byte order the directory reads raw values with.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Offset of the next directory in the page chain (0 = last page).
    #[inline]
    pub fn next_offset(&self) -> u32 {
        self.next
    }

    /// Number of tags present, decoded or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether a tag is present at all, even one whose field type can never
    /// be decoded.
    pub fn contains(&self, tag: impl Into<u16>) -> bool {
        self.slots.contains_key(&tag.into())
    }

    /// Store a value for a tag.
    pub fn set(&mut self, tag: impl Into<u16>, value: impl Into<Value>) {
        self.slots.insert(tag.into(), Slot::Decoded(value.into()));
    }

    fn reset(&mut self) {
        self.slots.clear();
        self.next = 0;
    }

    // -------------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------------

    /// Look up a tag, decoding it on first access.
    ///
    /// Returns `None` when the tag is absent or its field type is outside
    /// the supported set. The decoded value is cached; the raw form is
    /// discarded.
    pub fn get(&mut self, tag: impl Into<u16>) -> Option<&Value> {
        let tag = tag.into();
        let decoded = match self.slots.get(&tag)? {
            Slot::Raw { field_type, data } => {
                let field_type = FieldType::from_u16(*field_type)?;
                Some(decode(field_type, data, self.byte_order))
            }
            Slot::Decoded(_) => None,
        };
        if let Some(value) = decoded {
            self.slots.insert(tag, Slot::Decoded(value));
        }
        match self.slots.get(&tag) {
            Some(Slot::Decoded(value)) => Some(value),
            _ => None,
        }
    }

    /// Single-integer lookup. `Ok(None)` when the tag is absent or
    /// undecodable; an error when it is present but not a one-element
    /// numeric sequence.
    pub fn scalar(&mut self, tag: impl Into<u16>) -> Result<Option<u32>, TiffError> {
        let tag = tag.into();
        match self.get(tag) {
            None => Ok(None),
            Some(value) => match value.scalar() {
                Some(v) => Ok(Some(v)),
                None => Err(TiffError::InvalidTagValue {
                    tag,
                    message: format!("not a scalar ({} elements)", value.len()),
                }),
            },
        }
    }

    /// Single-integer lookup with a default for absent tags.
    pub fn scalar_or(&mut self, tag: impl Into<u16>, default: u32) -> Result<u32, TiffError> {
        Ok(self.scalar(tag)?.unwrap_or(default))
    }

    /// Single-integer lookup for a tag the format requires.
    pub fn require_scalar(
        &mut self,
        tag: impl Into<u16>,
        name: &'static str,
    ) -> Result<u32, TiffError> {
        self.scalar(tag)?.ok_or(TiffError::MissingTag(name))
    }

    // -------------------------------------------------------------------------
    // Load
    // -------------------------------------------------------------------------

    /// Load the directory from a stream positioned at its entry count.
    ///
    /// Values are stored raw; external spans are fetched eagerly (the bytes,
    /// not the decoding) with the stream position restored afterwards.
    /// Leaves the stream just past the next-directory offset.
    pub fn load<R: Read + Seek>(&mut self, fp: &mut R) -> Result<(), TiffError> {
        self.reset();

        let mut buf2 = [0u8; 2];
        read_exact_checked(fp, &mut buf2)?;
        let entry_count = self.byte_order.read_u16(&buf2);

        for _ in 0..entry_count {
            let mut entry = [0u8; ENTRY_SIZE];
            read_exact_checked(fp, &mut entry)?;

            let tag = self.byte_order.read_u16(&entry[0..]);
            let field_type = self.byte_order.read_u16(&entry[2..]);
            let count = self.byte_order.read_u32(&entry[4..]);

            let data = match FieldType::from_u16(field_type) {
                Some(ft) => {
                    let size = ft.size_in_bytes() as u64 * count as u64;
                    trace!(tag, field_type, count, size, "directory entry");
                    if size > INLINE_LIMIT {
                        let offset = self.byte_order.read_u32(&entry[8..]);
                        let here = fp.stream_position()?;
                        fp.seek(SeekFrom::Start(offset as u64))?;
                        let mut data = vec![0u8; size as usize];
                        read_exact_checked(fp, &mut data)?;
                        fp.seek(SeekFrom::Start(here))?;
                        Bytes::from(data)
                    } else {
                        Bytes::copy_from_slice(&entry[8..8 + size as usize])
                    }
                }
                None => {
                    // kept raw, never reachable through get()
                    trace!(tag, field_type, "unsupported field type");
                    Bytes::copy_from_slice(&entry[8..])
                }
            };

            self.slots.insert(tag, Slot::Raw { field_type, data });
        }

        let mut buf4 = [0u8; 4];
        read_exact_checked(fp, &mut buf4)?;
        self.next = self.byte_order.read_u32(&buf4);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Save
    // -------------------------------------------------------------------------

    /// Serialize the directory at the current stream position.
    ///
    /// Entries are written in ascending tag order. Numeric tags pick 16-bit
    /// width unless any value in the tag needs 32 bits; the strip-offset tag
    /// is always 32-bit so its patch-up below cannot overflow. Values longer
    /// than 4 bytes land after the table, word-aligned, and the strip-offset
    /// value is bumped by the final data offset so it points past them.
    ///
    /// The save path always emits little-endian.
    ///
    /// Returns the offset just past everything written; the caller appends
    /// pixel data there.
    pub fn save<W: Write + Seek>(&mut self, fp: &mut W) -> Result<u64, TiffError> {
        const ORDER: ByteOrder = ByteOrder::LittleEndian;

        struct Pending {
            tag: u16,
            field_type: u16,
            count: u32,
            value: [u8; 4],
            blob: Vec<u8>,
        }

        // pass 1: encode each tag to its on-disk bytes
        let tags: Vec<u16> = self.slots.keys().copied().collect();
        let mut entries: Vec<Pending> = Vec::new();
        for tag in tags {
            let Some(value) = self.get(tag) else { continue };
            let (field_type, count, data) = if let Value::Ascii(s) = value {
                let mut data = s.as_bytes().to_vec();
                data.push(0);
                (FieldType::Ascii, data.len() as u32, data)
            } else if let Some(values) = value.as_u32s() {
                let wide =
                    tag == Tag::StripOffsets.id() || values.iter().any(|&v| v >= 65536);
                let data = if wide {
                    values.iter().flat_map(|&v| ORDER.emit_u32(v)).collect()
                } else {
                    values
                        .iter()
                        .flat_map(|&v| ORDER.emit_u16(v as u16))
                        .collect::<Vec<u8>>()
                };
                let field_type = if wide { FieldType::Long } else { FieldType::Short };
                (field_type, values.len() as u32, data)
            } else {
                trace!(tag, "tag not serializable, skipped");
                continue;
            };
            trace!(tag, ?field_type, count, "save entry");
            entries.push(Pending {
                tag,
                field_type: field_type as u16,
                count,
                value: [0; 4],
                blob: data,
            });
        }

        // pass 2: place values inline or at a running external offset
        let start = fp.stream_position()?;
        let table_len = 2 + ENTRY_SIZE as u64 * entries.len() as u64 + 4;
        let mut offset = start + table_len;
        for entry in &mut entries {
            let len = entry.blob.len();
            if len as u64 <= INLINE_LIMIT {
                entry.value[..len].copy_from_slice(&entry.blob);
                entry.blob.clear();
            } else {
                entry.value = ORDER.emit_u32(offset as u32);
                offset += len as u64;
                if offset & 1 != 0 {
                    offset += 1; // word padding
                }
            }
        }

        // point strip offsets past the auxiliary data that follows the table
        if let Some(entry) = entries.iter_mut().find(|e| e.tag == Tag::StripOffsets.id()) {
            if !entry.blob.is_empty() {
                return Err(TiffError::MultiStrip);
            }
            let patched = ORDER.read_u32(&entry.value).wrapping_add(offset as u32);
            entry.value = ORDER.emit_u32(patched);
        }

        // pass 3: write the table, the terminator, then the external blobs
        fp.write_all(&ORDER.emit_u16(entries.len() as u16))?;
        for entry in &entries {
            fp.write_all(&ORDER.emit_u16(entry.tag))?;
            fp.write_all(&ORDER.emit_u16(entry.field_type))?;
            fp.write_all(&ORDER.emit_u32(entry.count))?;
            fp.write_all(&entry.value)?;
        }
        fp.write_all(&ORDER.emit_u32(0))?; // no next directory
        for entry in &entries {
            fp.write_all(&entry.blob)?;
            if entry.blob.len() & 1 != 0 {
                fp.write_all(&[0])?;
            }
        }

        Ok(offset)
    }
}

// =============================================================================
// Tests
// =============================================================================
